//! Piecewise-Linear Waveform Codec
//!
//! This crate converts a sparse list of `(amplitude, time)` waypoints into the
//! fixed-width command words consumed by a batch-based waveform playback
//! engine, and expands such command streams back into samples.
//!
//! # Pipeline
//!
//! ```text
//! waypoints -> PathBuilder -> BatchAligner -> PathCleaner -> CommandPacker -> words
//!                  (SlopeQuantizer)                                  |
//!                                                  samples <- Decoder
//! ```
//!
//! - **Slope quantization**: per-sample rates in decimal fixed point with
//!   exact integer reconstruction ([`slope`]).
//! - **Path building**: waypoints that continue a whole-number slope exactly
//!   collapse into one segment ([`path`]).
//! - **Batch alignment**: runs covering whole batches become sparse commands,
//!   sub-batch fragments stay dense ([`align`]).
//! - **Cleaning**: fragments inside a batch are merged ([`clean`]).
//! - **Packing**: versioned word layouts, 48-bit and 64-bit ([`pack`],
//!   [`config`]).
//!
//! # Example
//!
//! ```
//! use pwl_codec::{Codec, CodecConfig, Waypoint};
//!
//! let codec = Codec::new(CodecConfig::q16());
//!
//! // A ramp to 10 over ten samples, padded to one 16-sample batch.
//! let waypoints = [Waypoint::new(0, 0), Waypoint::new(10, 10)];
//! let stream = codec.encode(&waypoints)?;
//! assert_eq!(stream.len(), 2);
//!
//! let samples = codec.decode(&stream)?;
//! assert_eq!(samples.len(), 16);
//! assert_eq!(samples.get(9), Some(&9));
//! assert_eq!(samples.get(10), Some(&10));
//! # Ok::<(), pwl_codec::CodecError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod align;
pub mod clean;
pub mod command;
pub mod config;
pub mod decode;
pub mod encoder;
pub mod error;
pub mod pack;
pub mod path;
pub mod prelude;
pub mod slope;
pub mod stats;
pub mod waypoint;

pub use command::{Command, Tag};
pub use config::{CodecConfig, LayoutVersion, WordLayout};
pub use decode::Decoder;
pub use encoder::{Codec, EncoderState, PathEncoder, ReferenceEncoder, StreamingEncoder};
pub use error::{CodecError, ConfigError};
pub use pack::{CommandPacker, CommandStream};
pub use path::{PathBuilder, Segment};
pub use slope::{QuantizedSlope, SlopeQuantizer};
pub use stats::StreamStats;
pub use waypoint::Waypoint;

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
