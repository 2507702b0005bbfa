//! Path building: waypoints to merged linear segments.
//!
//! Every consecutive waypoint pair becomes a span starting exactly at the
//! first waypoint's amplitude. An adjacent span is merged into the open
//! segment when it continues it exactly, and a flat pad at the final
//! amplitude completes the last batch.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::command::offset_amplitude;
use crate::config::CodecConfig;
use crate::slope::{QuantizedSlope, SlopeQuantizer};
use crate::waypoint::{self, Waypoint};
use crate::Result;

/// A linear run of samples whose batch tagging is still undecided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    /// Amplitude of the first sample.
    pub x0: i32,
    /// Per-sample increment.
    pub slope: QuantizedSlope,
    /// Number of samples.
    pub dt: u32,
}

impl Segment {
    /// Create a segment.
    pub fn new(x0: i32, slope: QuantizedSlope, dt: u32) -> Self {
        Self { x0, slope, dt }
    }

    /// Amplitude one sample past the end of the segment.
    pub fn end_value(&self) -> i32 {
        offset_amplitude(self.x0, self.slope, u64::from(self.dt))
    }

    /// The `len` samples starting `start` samples in.
    ///
    /// The slice restarts from the projected amplitude at `start` and keeps
    /// the slope. Both bounds are clamped to the segment.
    pub fn slice(&self, start: u32, len: u32) -> Self {
        let start = start.min(self.dt);
        Self::new(
            offset_amplitude(self.x0, self.slope, u64::from(start)),
            self.slope,
            len.min(self.dt - start),
        )
    }

    /// Absorb `next` when it continues this segment. Returns false otherwise.
    ///
    /// The slopes must match and the projection must land exactly on
    /// `next.x0`. The slope must also be a whole number of units per sample,
    /// so that every later slice of the merged run still starts on the
    /// absorbed waypoint.
    pub fn try_merge(&mut self, next: &Self) -> bool {
        if self.slope != next.slope
            || self.slope.fraction() != 0
            || self.end_value() != next.x0
        {
            return false;
        }
        self.dt = self.dt.saturating_add(next.dt);
        true
    }
}

/// Iterator over the unmerged spans of a validated waypoint list.
///
/// A span whose quantized slope would carry the signal past its target is
/// split where it lands on the target, and the remainder is re-quantized from
/// there.
#[derive(Debug)]
pub struct Spans<'a> {
    pairs: std::slice::Windows<'a, Waypoint>,
    quantizer: SlopeQuantizer,
    carry: Option<Segment>,
}

impl<'a> Spans<'a> {
    /// Spans over `waypoints` using `quantizer`.
    pub fn new(waypoints: &'a [Waypoint], quantizer: SlopeQuantizer) -> Self {
        Self {
            pairs: waypoints.windows(2),
            quantizer,
            carry: None,
        }
    }

    fn span(&mut self, a: Waypoint, b: Waypoint) -> Segment {
        let dx = i64::from(b.x) - i64::from(a.x);
        let dt = b.t.saturating_sub(a.t);
        let slope = self.quantizer.quantize(dx, u64::from(dt));
        let Some(t) = self.quantizer.overshoot_length(slope, dx, u64::from(dt)) else {
            return Segment::new(a.x, slope, dt);
        };
        let t = u32::try_from(t).unwrap_or(dt);
        warn!(
            from = a.t,
            to = b.t,
            slope = %slope,
            corrected_at = t,
            "quantized slope overshoots waypoint; splitting span"
        );
        let head = Segment::new(a.x, slope, t);
        let landed = head.end_value();
        let rest = dt - t;
        let rest_slope = self
            .quantizer
            .quantize(i64::from(b.x) - i64::from(landed), u64::from(rest));
        self.carry = Some(Segment::new(landed, rest_slope, rest));
        head
    }
}

impl Iterator for Spans<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        if let Some(carry) = self.carry.take() {
            return Some(carry);
        }
        match self.pairs.next()? {
            [a, b] => Some(self.span(*a, *b)),
            _ => None,
        }
    }
}

/// Flat segment that completes the final batch, if the last waypoint does not
/// already end on a batch boundary.
pub fn final_padding(waypoints: &[Waypoint], config: &CodecConfig) -> Option<Segment> {
    let last = waypoints.last()?;
    let batch_size = config.batch_size();
    let partial = last.t.checked_rem(batch_size)?;
    (partial != 0).then(|| {
        Segment::new(
            last.x,
            QuantizedSlope::flat(config.fixed_point_precision()),
            batch_size - partial,
        )
    })
}

/// Builds the merged segment list for a waypoint list.
#[derive(Debug, Clone, Copy)]
pub struct PathBuilder {
    config: CodecConfig,
    quantizer: SlopeQuantizer,
}

impl PathBuilder {
    /// Builder for `config`.
    pub fn new(config: &CodecConfig) -> Self {
        Self {
            config: *config,
            quantizer: SlopeQuantizer::new(config.fixed_point_precision()),
        }
    }

    /// Quantizer used for every span.
    pub fn quantizer(&self) -> SlopeQuantizer {
        self.quantizer
    }

    /// Flat padding for `waypoints`.
    pub fn padding(&self, waypoints: &[Waypoint]) -> Option<Segment> {
        final_padding(waypoints, &self.config)
    }

    /// Unmerged spans followed by the padding segment.
    ///
    /// # Errors
    ///
    /// Fails when `waypoints` does not pass [`waypoint::validate`].
    pub fn spans(&self, waypoints: &[Waypoint]) -> Result<Vec<Segment>> {
        waypoint::validate(waypoints, &self.config)?;
        let mut out: Vec<Segment> = Spans::new(waypoints, self.quantizer).collect();
        out.extend(self.padding(waypoints));
        Ok(out)
    }

    /// Merged segment list, padding included.
    ///
    /// # Errors
    ///
    /// Fails when `waypoints` does not pass [`waypoint::validate`].
    pub fn build(&self, waypoints: &[Waypoint]) -> Result<Vec<Segment>> {
        let spans = self.spans(waypoints)?;
        let span_count = spans.len();
        let mut segments: Vec<Segment> = Vec::with_capacity(span_count);
        for span in spans {
            if let Some(open) = segments.last_mut()
                && open.try_merge(&span)
            {
                continue;
            }
            segments.push(span);
        }
        debug!(
            waypoints = waypoints.len(),
            spans = span_count,
            segments = segments.len(),
            "built path"
        );
        Ok(segments)
    }
}
