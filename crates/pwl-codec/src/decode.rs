//! Decoding: packed words back to commands and per-sample waveforms.

use tracing::debug;

use crate::align::check_alignment;
use crate::command::{Command, Tag};
use crate::config::{low_mask, CodecConfig, WordLayout};
use crate::error::CodecError;
use crate::pack::CommandStream;
use crate::slope::QuantizedSlope;
use crate::Result;

/// Sign-extend the low `width` bits of `raw`.
fn sign_extend(raw: u64, width: u32) -> i64 {
    if width == 0 {
        return 0;
    }
    if width >= 64 {
        return raw.cast_signed();
    }
    let shift = 64 - width;
    (raw << shift).cast_signed() >> shift
}

/// Inverse of [`CommandPacker`](crate::pack::CommandPacker) plus expansion.
#[derive(Debug, Clone, Copy)]
pub struct Decoder {
    config: CodecConfig,
}

impl Decoder {
    /// Decoder for `config`.
    pub fn new(config: &CodecConfig) -> Self {
        Self { config: *config }
    }

    fn layout(&self) -> &WordLayout {
        self.config.layout()
    }

    /// Unpack one word.
    ///
    /// The binary slope is converted back to decimal ticks by truncation
    /// toward zero, so packing the result again gives the same word whenever
    /// `2^frac_bits <= 10^precision`.
    pub fn decode_word(&self, word: u64) -> Command {
        let layout = self.layout();
        let field = |shift: u32, width: u32| (word >> shift) & low_mask(width);

        let x = sign_extend(
            field(layout.amplitude_shift(), layout.amplitude_width()),
            layout.amplitude_width(),
        );
        let raw = sign_extend(
            field(layout.slope_shift(), layout.slope_width()),
            layout.slope_width(),
        );
        let dt = field(layout.duration_shift(), layout.duration_width());
        let sparse = word & 1 == 1;

        let precision = self.config.fixed_point_precision();
        let unit = i128::from(QuantizedSlope::flat(precision).unit());
        let ticks = i128::from(raw) * unit / (1i128 << layout.slope_frac_bits().min(63));
        let ticks = i64::try_from(ticks).unwrap_or(if ticks < 0 { i64::MIN } else { i64::MAX });

        Command {
            x: i32::try_from(x).unwrap_or(if x < 0 { i32::MIN } else { i32::MAX }),
            slope: QuantizedSlope::from_ticks(ticks, precision),
            dt: u32::try_from(dt).unwrap_or(u32::MAX),
            tag: if sparse { Tag::Sparse } else { Tag::Dense },
        }
    }

    /// Unpack a word list.
    pub fn decode_commands(&self, words: &[u64]) -> Vec<Command> {
        words.iter().map(|word| self.decode_word(*word)).collect()
    }

    /// Expand commands into samples.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::BatchAlignmentViolation`] for a command that
    /// breaks the batch grid and [`CodecError::UnevenWaveform`] when the total
    /// is not a whole number of batches.
    pub fn expand(&self, commands: &[Command]) -> Result<Vec<i32>> {
        let batch_size = self.config.batch_size();
        check_alignment(commands, batch_size)?;

        let total: u64 = commands.iter().map(|c| u64::from(c.dt)).sum();
        if total % u64::from(batch_size) != 0 {
            return Err(CodecError::UnevenWaveform {
                samples: total,
                batch_size,
            });
        }

        let mut samples = Vec::with_capacity(usize::try_from(total).unwrap_or(0));
        for command in commands {
            samples.extend((0..command.dt).map(|offset| command.sample(offset)));
        }
        debug!(
            commands = commands.len(),
            samples = samples.len(),
            "expanded waveform"
        );
        Ok(samples)
    }

    /// Decode a packed stream to samples.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::LayoutMismatch`] when the stream was packed with
    /// another layout, plus every error of [`Decoder::expand`].
    pub fn decode(&self, stream: &CommandStream) -> Result<Vec<i32>> {
        if stream.layout() != self.layout() {
            return Err(CodecError::LayoutMismatch {
                expected: self.layout().version(),
                found: stream.layout().version(),
            });
        }
        self.expand(&self.decode_commands(stream.words()))
    }

    /// Decode a packed stream to samples grouped per batch.
    ///
    /// # Errors
    ///
    /// See [`Decoder::decode`].
    pub fn decode_batches(&self, stream: &CommandStream) -> Result<Vec<Vec<i32>>> {
        let samples = self.decode(stream)?;
        let batch = usize::try_from(self.config.batch_size()).unwrap_or(usize::MAX);
        Ok(samples.chunks(batch).map(<[i32]>::to_vec).collect())
    }
}
