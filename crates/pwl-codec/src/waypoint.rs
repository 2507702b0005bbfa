//! Waveform waypoints and input validation.

use serde::{Deserialize, Serialize};

use crate::config::CodecConfig;
use crate::error::CodecError;
use crate::Result;

/// A point the output waveform must pass through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Waypoint {
    /// Amplitude.
    pub x: i32,
    /// Sample index.
    pub t: u32,
}

impl Waypoint {
    /// Create a waypoint.
    pub const fn new(x: i32, t: u32) -> Self {
        Self { x, t }
    }
}

impl From<(i32, u32)> for Waypoint {
    fn from((x, t): (i32, u32)) -> Self {
        Self { x, t }
    }
}

/// Check a waypoint list against the codec's input rules.
///
/// The list needs at least two points, must start at `t = 0`, advance
/// strictly in time and keep every amplitude inside the amplitude field. The
/// padded waveform length must also fit the time axis.
///
/// # Errors
///
/// Returns the first violation found, in list order.
pub fn validate(waypoints: &[Waypoint], config: &CodecConfig) -> Result<()> {
    let [first, .., last] = waypoints else {
        return Err(CodecError::TooFewWaypoints {
            count: waypoints.len(),
        });
    };
    if first.t != 0 {
        return Err(CodecError::NonZeroStart { t: first.t });
    }

    let (min, max) = config.amplitude_range();
    for (index, point) in waypoints.iter().enumerate() {
        let x = i64::from(point.x);
        if x < min || x > max {
            return Err(CodecError::AmplitudeOutOfRange { index, x, min, max });
        }
    }

    for (index, pair) in waypoints.windows(2).enumerate() {
        if let [a, b] = pair
            && b.t <= a.t
        {
            return Err(CodecError::DegenerateDuration {
                index: index + 1,
                previous: a.t,
                t: b.t,
            });
        }
    }

    let batch = u64::from(config.batch_size());
    let total = u64::from(last.t).div_ceil(batch) * batch;
    if total > u64::from(u32::MAX) {
        return Err(CodecError::DurationOverflow {
            index: waypoints.len() - 1,
            dt: total,
            max: u64::from(u32::MAX),
        });
    }
    Ok(())
}

/// Indices of interior waypoints that lie exactly on the straight line
/// through their neighbours.
///
/// Dropping them leaves the ideal waveform unchanged. The test is exact:
/// `dx1 * dt2 == dx2 * dt1`.
pub fn redundant_waypoints(waypoints: &[Waypoint]) -> Vec<usize> {
    waypoints
        .windows(3)
        .enumerate()
        .filter_map(|(i, triple)| match triple {
            [a, b, c] => {
                let dx1 = i128::from(b.x) - i128::from(a.x);
                let dt1 = i128::from(b.t) - i128::from(a.t);
                let dx2 = i128::from(c.x) - i128::from(b.x);
                let dt2 = i128::from(c.t) - i128::from(b.t);
                (dx1 * dt2 == dx2 * dt1).then_some(i + 1)
            }
            _ => None,
        })
        .collect()
}
