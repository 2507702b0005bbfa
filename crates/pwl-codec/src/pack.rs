//! Command packing into fixed-width words, and the serialized stream.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::command::Command;
use crate::config::{low_mask, CodecConfig, WordLayout};
use crate::error::CodecError;
use crate::slope::QuantizedSlope;
use crate::Result;

/// Convert decimal slope ticks to the layout's binary fixed point,
/// rounding half up.
pub fn slope_to_raw(slope: QuantizedSlope, frac_bits: u32) -> i128 {
    let unit = i128::from(slope.unit());
    let scale = 1i128 << frac_bits.min(63);
    (2 * i128::from(slope.ticks()) * scale + unit).div_euclid(2 * unit)
}

/// Serializes commands according to a [`WordLayout`].
#[derive(Debug, Clone, Copy)]
pub struct CommandPacker {
    layout: WordLayout,
}

impl CommandPacker {
    /// Packer for `config`.
    pub fn new(config: &CodecConfig) -> Self {
        Self {
            layout: *config.layout(),
        }
    }

    /// Packing layout.
    pub fn layout(&self) -> &WordLayout {
        &self.layout
    }

    /// Pack one command. `index` is only used for error context.
    ///
    /// # Errors
    ///
    /// Fails when the amplitude, slope or duration does not fit its field.
    pub fn pack(&self, index: usize, command: &Command) -> Result<u64> {
        let layout = &self.layout;

        let x = i64::from(command.x);
        let (min, max) = layout.amplitude_range();
        if x < min || x > max {
            return Err(CodecError::AmplitudeOutOfRange { index, x, min, max });
        }

        let raw = slope_to_raw(command.slope, layout.slope_frac_bits());
        let (slope_min, slope_max) = layout.slope_range();
        let raw = match i64::try_from(raw) {
            Ok(raw) if raw >= slope_min && raw <= slope_max => raw,
            _ => {
                return Err(CodecError::QuantizationOverflow {
                    index,
                    slope: command.slope,
                    raw: i64::try_from(raw).unwrap_or(if raw < 0 { i64::MIN } else { i64::MAX }),
                    min: slope_min,
                    max: slope_max,
                });
            }
        };

        if command.dt > layout.max_duration() {
            return Err(CodecError::DurationOverflow {
                index,
                dt: u64::from(command.dt),
                max: u64::from(layout.max_duration()),
            });
        }

        let amplitude = x.cast_unsigned() & low_mask(layout.amplitude_width());
        let slope = raw.cast_unsigned() & low_mask(layout.slope_width());
        let duration = u64::from(command.dt);
        let flag = u64::from(command.is_sparse());

        Ok((amplitude << layout.amplitude_shift())
            | (slope << layout.slope_shift())
            | (duration << layout.duration_shift())
            | flag)
    }

    /// Pack a whole command list. No partial output on failure.
    ///
    /// # Errors
    ///
    /// See [`CommandPacker::pack`].
    pub fn pack_all(&self, commands: &[Command]) -> Result<CommandStream> {
        let words = commands
            .iter()
            .enumerate()
            .map(|(index, command)| self.pack(index, command))
            .collect::<Result<Vec<_>>>()?;
        debug!(
            commands = words.len(),
            word_width = self.layout.word_width(),
            "packed command stream"
        );
        Ok(CommandStream::new(self.layout, words))
    }
}

/// Packed command words together with the layout they were packed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandStream {
    layout: WordLayout,
    words: Vec<u64>,
}

impl CommandStream {
    /// Wrap already packed words.
    pub fn new(layout: WordLayout, words: Vec<u64>) -> Self {
        Self { layout, words }
    }

    /// Layout of every word.
    pub fn layout(&self) -> &WordLayout {
        &self.layout
    }

    /// Packed words in playback order.
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// True when the stream holds no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Consume the stream and return its words.
    pub fn into_words(self) -> Vec<u64> {
        self.words
    }

    /// Little-endian bytes, `word_bytes` per word.
    pub fn to_bytes(&self) -> Vec<u8> {
        let width = self.layout.word_bytes();
        let mut bytes = Vec::with_capacity(self.words.len().saturating_mul(width));
        for word in &self.words {
            bytes.extend(word.to_le_bytes().iter().take(width));
        }
        bytes
    }

    /// Parse a little-endian byte stream.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::TruncatedStream`] when the length is not a whole
    /// number of words.
    pub fn from_bytes(layout: WordLayout, bytes: &[u8]) -> Result<Self> {
        let width = layout.word_bytes();
        if width == 0 || bytes.len() % width != 0 {
            return Err(CodecError::TruncatedStream {
                len: bytes.len(),
                word_bytes: width,
            });
        }
        let words = bytes
            .chunks_exact(width)
            .map(|chunk| {
                let mut buf = [0u8; 8];
                for (dst, src) in buf.iter_mut().zip(chunk) {
                    *dst = *src;
                }
                u64::from_le_bytes(buf)
            })
            .collect();
        Ok(Self { layout, words })
    }
}
