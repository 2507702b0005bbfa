//! Waypoint encoders and the codec facade.
//!
//! Two encoders produce identical command lists:
//!
//! - [`ReferenceEncoder`] runs the stages one after another: path building,
//!   batch alignment, then cleaning.
//! - [`StreamingEncoder`] makes a single pass, merging spans as they arrive
//!   and feeding closed segments through the aligner into an incremental
//!   cleaning pass.
//!
//! [`Codec`] ties an encoder to the packer and decoder for one configuration.

use tracing::debug;

use crate::align::{self, check_alignment, BatchAligner};
use crate::clean::{CleanPass, PathCleaner};
use crate::command::Command;
use crate::config::CodecConfig;
use crate::decode::Decoder;
use crate::pack::{CommandPacker, CommandStream};
use crate::path::{PathBuilder, Segment, Spans};
use crate::waypoint::{self, Waypoint};
use crate::Result;

/// Turns a waypoint list into batch-aligned commands.
pub trait PathEncoder {
    /// Short name used in logs and benchmarks.
    fn name(&self) -> &'static str;

    /// Encode `waypoints`.
    ///
    /// # Errors
    ///
    /// Fails when the waypoints are invalid for the encoder's configuration.
    fn encode_commands(&self, waypoints: &[Waypoint]) -> Result<Vec<Command>>;
}

fn debug_check(commands: &[Command], config: &CodecConfig) -> Result<()> {
    if cfg!(debug_assertions) {
        check_alignment(commands, config.batch_size())?;
    }
    Ok(())
}

/// Stage-by-stage encoder.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceEncoder {
    config: CodecConfig,
}

impl ReferenceEncoder {
    /// Encoder for `config`.
    pub fn new(config: &CodecConfig) -> Self {
        Self { config: *config }
    }
}

impl PathEncoder for ReferenceEncoder {
    fn name(&self) -> &'static str {
        "reference"
    }

    fn encode_commands(&self, waypoints: &[Waypoint]) -> Result<Vec<Command>> {
        let segments = PathBuilder::new(&self.config).build(waypoints)?;
        let aligned = align::align(&segments, &self.config);
        let commands = PathCleaner::new(&self.config).clean(&aligned)?;
        debug_check(&commands, &self.config)?;
        debug!(
            encoder = self.name(),
            waypoints = waypoints.len(),
            segments = segments.len(),
            commands = commands.len(),
            "encoded waypoints"
        );
        Ok(commands)
    }
}

/// Phase of a streaming encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderState {
    /// Consuming spans and merging continuations.
    Accumulating,
    /// Spans exhausted; pad and release the open segment.
    FlushingFinal,
    /// All commands emitted.
    Done,
}

#[derive(Debug)]
struct StreamingPass<'a> {
    spans: Spans<'a>,
    padding: Option<Segment>,
    open: Option<Segment>,
    aligner: BatchAligner,
    cleaner: CleanPass,
    state: EncoderState,
}

impl StreamingPass<'_> {
    fn step(&mut self) -> Result<()> {
        self.state = match self.state {
            EncoderState::Accumulating => self.accumulate()?,
            EncoderState::FlushingFinal => self.flush_final()?,
            EncoderState::Done => EncoderState::Done,
        };
        Ok(())
    }

    fn accumulate(&mut self) -> Result<EncoderState> {
        match self.spans.next() {
            Some(span) => {
                self.absorb(span)?;
                Ok(EncoderState::Accumulating)
            }
            None => Ok(EncoderState::FlushingFinal),
        }
    }

    fn flush_final(&mut self) -> Result<EncoderState> {
        if let Some(pad) = self.padding.take() {
            self.absorb(pad)?;
        }
        if let Some(open) = self.open.take() {
            self.release(open)?;
        }
        Ok(EncoderState::Done)
    }

    fn absorb(&mut self, segment: Segment) -> Result<()> {
        if let Some(open) = self.open.as_mut()
            && open.try_merge(&segment)
        {
            return Ok(());
        }
        match self.open.replace(segment) {
            Some(closed) => self.release(closed),
            None => Ok(()),
        }
    }

    fn release(&mut self, segment: Segment) -> Result<()> {
        self.aligner.push(segment);
        for command in self.aligner.drain() {
            self.cleaner.push(command)?;
        }
        Ok(())
    }
}

/// Single-pass encoder.
#[derive(Debug, Clone, Copy)]
pub struct StreamingEncoder {
    config: CodecConfig,
}

impl StreamingEncoder {
    /// Encoder for `config`.
    pub fn new(config: &CodecConfig) -> Self {
        Self { config: *config }
    }
}

impl PathEncoder for StreamingEncoder {
    fn name(&self) -> &'static str {
        "streaming"
    }

    fn encode_commands(&self, waypoints: &[Waypoint]) -> Result<Vec<Command>> {
        waypoint::validate(waypoints, &self.config)?;
        let builder = PathBuilder::new(&self.config);
        let capacity = waypoints.len().saturating_sub(1).saturating_mul(6);

        let mut pass = StreamingPass {
            spans: Spans::new(waypoints, builder.quantizer()),
            padding: builder.padding(waypoints),
            open: None,
            aligner: BatchAligner::new(&self.config),
            cleaner: PathCleaner::new(&self.config).pass(capacity),
            state: EncoderState::Accumulating,
        };
        while pass.state != EncoderState::Done {
            pass.step()?;
        }

        let commands = pass.cleaner.finish();
        debug_check(&commands, &self.config)?;
        debug!(
            encoder = self.name(),
            waypoints = waypoints.len(),
            commands = commands.len(),
            "encoded waypoints"
        );
        Ok(commands)
    }
}

/// Encoder, packer and decoder for one configuration.
///
/// # Example
///
/// ```
/// use pwl_codec::{Codec, CodecConfig, Waypoint};
///
/// let codec = Codec::new(CodecConfig::q16());
/// let stream = codec.encode(&[Waypoint::new(0, 0), Waypoint::new(32, 32)])?;
/// assert_eq!(stream.len(), 1);
///
/// let samples = codec.decode(&stream)?;
/// assert_eq!(samples.len(), 32);
/// assert_eq!(samples.last(), Some(&31));
/// # Ok::<(), pwl_codec::CodecError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Codec {
    config: CodecConfig,
}

impl Codec {
    /// Codec for `config`.
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encode with the streaming encoder and return unpacked commands.
    ///
    /// # Errors
    ///
    /// See [`PathEncoder::encode_commands`].
    pub fn commands(&self, waypoints: &[Waypoint]) -> Result<Vec<Command>> {
        StreamingEncoder::new(&self.config).encode_commands(waypoints)
    }

    /// Encode and pack with the streaming encoder.
    ///
    /// # Errors
    ///
    /// Fails on invalid waypoints or when a command does not fit the layout.
    pub fn encode(&self, waypoints: &[Waypoint]) -> Result<CommandStream> {
        self.encode_with(&StreamingEncoder::new(&self.config), waypoints)
    }

    /// Encode with `encoder` and pack.
    ///
    /// # Errors
    ///
    /// See [`Codec::encode`].
    pub fn encode_with<E: PathEncoder + ?Sized>(
        &self,
        encoder: &E,
        waypoints: &[Waypoint],
    ) -> Result<CommandStream> {
        let commands = encoder.encode_commands(waypoints)?;
        CommandPacker::new(&self.config).pack_all(&commands)
    }

    /// Decode a packed stream to samples.
    ///
    /// # Errors
    ///
    /// See [`Decoder::decode`].
    pub fn decode(&self, stream: &CommandStream) -> Result<Vec<i32>> {
        Decoder::new(&self.config).decode(stream)
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}
