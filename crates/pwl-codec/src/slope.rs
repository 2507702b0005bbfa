//! Fixed-point slope quantization.
//!
//! A slope is stored as a signed count of ticks, where one tick is
//! `10^-precision` amplitude units per sample. All arithmetic on quantized
//! slopes is exact integer arithmetic, so every encoder and the decoder
//! reconstruct identical samples from the same slope.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::MAX_PRECISION;

/// A per-sample rate of change in decimal fixed point.
///
/// Equality is exact: two slopes are equal only when their tick counts and
/// precisions match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuantizedSlope {
    ticks: i64,
    precision: u8,
}

impl QuantizedSlope {
    /// Build a slope from a raw tick count.
    ///
    /// Precisions above [`MAX_PRECISION`] are clamped.
    pub fn from_ticks(ticks: i64, precision: u8) -> Self {
        Self {
            ticks,
            precision: precision.min(MAX_PRECISION),
        }
    }

    /// A zero slope at the given precision.
    pub fn flat(precision: u8) -> Self {
        Self::from_ticks(0, precision)
    }

    /// Signed tick count.
    pub fn ticks(&self) -> i64 {
        self.ticks
    }

    /// Decimal digits in the fraction.
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Ticks per amplitude unit, `10^precision`.
    pub fn unit(&self) -> i64 {
        10i64.pow(u32::from(self.precision))
    }

    /// `-1` for falling slopes, `1` otherwise.
    pub fn sign(&self) -> i8 {
        if self.ticks < 0 { -1 } else { 1 }
    }

    /// Integer part of the magnitude.
    pub fn whole(&self) -> u64 {
        self.ticks.unsigned_abs() / self.unit().unsigned_abs()
    }

    /// Fractional part of the magnitude, in ticks.
    pub fn fraction(&self) -> u64 {
        self.ticks.unsigned_abs() % self.unit().unsigned_abs()
    }

    /// True for a zero slope.
    pub fn is_flat(&self) -> bool {
        self.ticks == 0
    }

    /// Approximate value as a float, for display and statistics.
    pub fn to_f64(&self) -> f64 {
        self.ticks as f64 / self.unit() as f64
    }

    /// Projected amplitude change after `offset` samples.
    ///
    /// Rounds half up, `floor(slope * offset + 0.5)`.
    pub fn scale(&self, offset: u64) -> i64 {
        let unit = i128::from(self.unit());
        let numerator = 2 * i128::from(self.ticks) * i128::from(offset) + unit;
        let value = numerator.div_euclid(2 * unit);
        i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
    }
}

impl fmt::Display for QuantizedSlope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.ticks < 0 { "-" } else { "" };
        if self.precision == 0 {
            write!(f, "{}{}", sign, self.whole())
        } else {
            write!(
                f,
                "{}{}.{:0width$}",
                sign,
                self.whole(),
                self.fraction(),
                width = usize::from(self.precision)
            )
        }
    }
}

/// Converts amplitude deltas over sample counts into [`QuantizedSlope`]s.
///
/// With `scaled = dx * 10^p / dt`, the quantizer takes `ceil(scaled)` when
/// `scaled < -1` or `0 < scaled < 1` and `floor(scaled)` otherwise. That is
/// truncation toward zero, except that a non-zero rate never collapses to a
/// flat slope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlopeQuantizer {
    precision: u8,
}

impl SlopeQuantizer {
    /// Quantizer with `precision` decimal digits (clamped to
    /// [`MAX_PRECISION`]).
    pub fn new(precision: u8) -> Self {
        Self {
            precision: precision.min(MAX_PRECISION),
        }
    }

    /// Decimal digits kept in the fraction.
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Quantize `dx / dt`. A zero `dt` yields a flat slope.
    pub fn quantize(&self, dx: i64, dt: u64) -> QuantizedSlope {
        let unit = i128::from(10i64.pow(u32::from(self.precision)));
        let scaled = (i128::from(dx) * unit)
            .checked_div(i128::from(dt))
            .unwrap_or(0);
        let ticks = if scaled == 0 && dx != 0 && dt != 0 {
            i128::from(dx.signum())
        } else {
            scaled
        };
        let ticks = i64::try_from(ticks).unwrap_or(if ticks < 0 { i64::MIN } else { i64::MAX });
        QuantizedSlope::from_ticks(ticks, self.precision)
    }

    /// Length at which `slope` lands exactly on `dx`, when projecting it over
    /// the full `dt` would carry the signal past `dx`.
    ///
    /// Returns `None` when the slope stays on the near side of the target for
    /// every sample in `[0, dt)`.
    pub fn overshoot_length(&self, slope: QuantizedSlope, dx: i64, dt: u64) -> Option<u64> {
        if slope.is_flat() || dt < 2 {
            return None;
        }
        let end = slope.scale(dt - 1);
        let passed = (dx >= 0 && end > dx) || (dx <= 0 && end < dx);
        if !passed {
            return None;
        }
        let t = (u128::from(dx.unsigned_abs()) * u128::from(slope.unit().unsigned_abs()))
            / u128::from(slope.ticks().unsigned_abs());
        let t = u64::try_from(t).ok()?;
        trace!(dx, dt, t, slope = %slope, "slope overshoots target");
        (1..dt).contains(&t).then_some(t)
    }
}

impl Default for SlopeQuantizer {
    fn default() -> Self {
        Self::new(8)
    }
}
