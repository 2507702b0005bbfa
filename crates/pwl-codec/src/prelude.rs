//! Prelude for the codec
//!
//! Re-exports the types most callers need to encode and decode waveforms.

pub use crate::command::{Command, Tag};
pub use crate::config::{CodecConfig, LayoutVersion, WordLayout};
pub use crate::encoder::{Codec, PathEncoder, ReferenceEncoder, StreamingEncoder};
pub use crate::error::{CodecError, ConfigError};
pub use crate::pack::CommandStream;
pub use crate::slope::QuantizedSlope;
pub use crate::stats::StreamStats;
pub use crate::waypoint::Waypoint;
pub use crate::Result;
