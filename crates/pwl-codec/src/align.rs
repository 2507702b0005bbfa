//! Batch alignment: segments to dense and sparse commands.
//!
//! A sparse command may only start on a batch boundary and must cover whole
//! batches. Dense commands fill the gaps and never cross a boundary.

use tracing::trace;

use crate::command::{Command, Tag};
use crate::config::CodecConfig;
use crate::error::CodecError;
use crate::path::Segment;
use crate::Result;

/// Streaming splitter that tags segments against the batch grid.
#[derive(Debug, Clone)]
pub struct BatchAligner {
    batch_size: u32,
    max_sparse: u32,
    offset: u32,
    commands: Vec<Command>,
}

impl BatchAligner {
    /// Aligner for `config`.
    pub fn new(config: &CodecConfig) -> Self {
        Self::with_capacity(config, 0)
    }

    /// Aligner with room for `capacity` commands.
    pub fn with_capacity(config: &CodecConfig, capacity: usize) -> Self {
        Self {
            batch_size: config.batch_size(),
            max_sparse: config.max_sparse_duration(),
            offset: 0,
            commands: Vec::with_capacity(capacity),
        }
    }

    /// Position inside the current batch.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Commands emitted so far.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Take the commands emitted so far. The batch position is kept.
    pub fn drain(&mut self) -> std::vec::Drain<'_, Command> {
        self.commands.drain(..)
    }

    /// Split `segment` against the batch grid and append the parts.
    ///
    /// Every part is a [`Segment::slice`] of `segment` itself, so a long run
    /// split into many chunks stays on its own projection.
    pub fn push(&mut self, segment: Segment) {
        let mut done = 0;

        if self.offset > 0 && segment.dt > 0 {
            let fill = segment.dt.min(self.batch_size - self.offset);
            self.emit(Tag::Dense, segment.slice(0, fill));
            self.offset = (self.offset + fill) % self.batch_size;
            done = fill;
        }

        let left = segment.dt - done;
        let mut whole = left - left % self.batch_size;
        while whole > 0 {
            let chunk = whole.min(self.max_sparse);
            self.emit(Tag::Sparse, segment.slice(done, chunk));
            done += chunk;
            whole -= chunk;
        }

        if done < segment.dt {
            let rest = segment.dt - done;
            self.emit(Tag::Dense, segment.slice(done, rest));
            self.offset = rest;
        }
    }

    fn emit(&mut self, tag: Tag, part: Segment) {
        let command = Command {
            x: part.x0,
            slope: part.slope,
            dt: part.dt,
            tag,
        };
        trace!(
            x = command.x,
            slope = %command.slope,
            dt = command.dt,
            sparse = command.is_sparse(),
            "emit command"
        );
        self.commands.push(command);
    }

    /// Finish and return the command list.
    pub fn finish(self) -> Vec<Command> {
        self.commands
    }
}

/// Align a whole segment list.
pub fn align(segments: &[Segment], config: &CodecConfig) -> Vec<Command> {
    let mut aligner = BatchAligner::with_capacity(config, segments.len().saturating_mul(3));
    for segment in segments {
        aligner.push(*segment);
    }
    aligner.finish()
}

/// Verify the batch-alignment rules over a command list.
///
/// Every command must be non-empty, sparse commands must start on a boundary
/// and cover whole batches, and dense commands must stay inside one batch. A
/// trailing partial batch is allowed here; expansion rejects it separately.
///
/// # Errors
///
/// Returns [`CodecError::BatchAlignmentViolation`] naming the first offending
/// command.
pub fn check_alignment(commands: &[Command], batch_size: u32) -> Result<()> {
    let mut offset: u64 = 0;
    let batch = u64::from(batch_size.max(1));
    for (index, command) in commands.iter().enumerate() {
        let dt = u64::from(command.dt);
        let violation = |reason| Err(CodecError::BatchAlignmentViolation { index, reason });
        if dt == 0 {
            return violation("command has zero duration");
        }
        match command.tag {
            Tag::Sparse => {
                if offset != 0 {
                    return violation("sparse command starts inside a batch");
                }
                if dt % batch != 0 {
                    return violation("sparse duration is not a whole number of batches");
                }
            }
            Tag::Dense => {
                if offset + dt > batch {
                    return violation("dense command crosses a batch boundary");
                }
                offset = (offset + dt) % batch;
            }
        }
    }
    Ok(())
}
