//! Finalized playback commands.

use serde::{Deserialize, Serialize};

use crate::slope::QuantizedSlope;

/// How the playback engine consumes a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    /// A fragment inside one batch, expanded sample by sample.
    Dense,
    /// One or more whole batches generated from a single word.
    Sparse,
}

/// One `(start value, slope, duration)` run of samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Command {
    /// Amplitude of the first sample.
    pub x: i32,
    /// Per-sample increment.
    pub slope: QuantizedSlope,
    /// Number of samples.
    pub dt: u32,
    /// Dense or sparse.
    pub tag: Tag,
}

impl Command {
    /// A dense command.
    pub fn dense(x: i32, slope: QuantizedSlope, dt: u32) -> Self {
        Self {
            x,
            slope,
            dt,
            tag: Tag::Dense,
        }
    }

    /// A sparse command.
    pub fn sparse(x: i32, slope: QuantizedSlope, dt: u32) -> Self {
        Self {
            x,
            slope,
            dt,
            tag: Tag::Sparse,
        }
    }

    /// True when the sparse flag is set.
    pub fn is_sparse(&self) -> bool {
        self.tag == Tag::Sparse
    }

    /// Sample at `offset` samples into the command.
    pub fn sample(&self, offset: u32) -> i32 {
        offset_amplitude(self.x, self.slope, u64::from(offset))
    }

    /// Amplitude one sample past the end of the command.
    pub fn end_value(&self) -> i32 {
        self.sample(self.dt)
    }

    /// True when `next` can be absorbed into `self` without changing a single
    /// generated sample.
    pub fn extends(&self, next: &Self) -> bool {
        if self.slope != next.slope || self.end_value() != next.x {
            return false;
        }
        if next.slope.fraction() == 0 {
            return true;
        }
        let base = u64::from(self.dt);
        (0..u64::from(next.dt)).all(|j| {
            offset_amplitude(self.x, self.slope, base + j)
                == offset_amplitude(next.x, next.slope, j)
        })
    }
}

/// `x + slope.scale(offset)`, saturated to the `i32` range.
pub(crate) fn offset_amplitude(x: i32, slope: QuantizedSlope, offset: u64) -> i32 {
    let value = i64::from(x).saturating_add(slope.scale(offset));
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}
