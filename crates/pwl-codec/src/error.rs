//! Error types for codec configuration, encoding and decoding.

use crate::slope::QuantizedSlope;

/// Configuration validation failures.
///
/// Returned by the validating constructors of
/// [`CodecConfig`](crate::config::CodecConfig) and
/// [`WordLayout`](crate::config::WordLayout).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A field width was zero.
    #[error("{field} must be non-zero")]
    ZeroWidth {
        /// Name of the offending field.
        field: &'static str,
    },

    /// Command words wider than 64 bits are not supported.
    #[error("word width {word_width} exceeds 64 bits")]
    WordTooWide {
        /// Requested word width in bits.
        word_width: u32,
    },

    /// The packed fields plus the sparse flag do not fit the word.
    #[error("fields need {used} bits but the word is only {word_width} bits wide")]
    FieldsExceedWord {
        /// Bits consumed by amplitude + slope + duration + flag.
        used: u32,
        /// Configured word width.
        word_width: u32,
    },

    /// The slope fraction leaves no room for the sign and integer part.
    #[error("slope fraction of {frac_bits} bits does not fit a {slope_width}-bit slope field")]
    SlopeFractionTooWide {
        /// Fractional bits of the slope Q-format.
        frac_bits: u32,
        /// Total slope field width.
        slope_width: u32,
    },

    /// Durations are limited to 32 bits.
    #[error("duration width {duration_width} exceeds 32 bits")]
    DurationFieldTooWide {
        /// Requested duration width.
        duration_width: u32,
    },

    /// The amplitude field must hold exactly one hardware sample.
    #[error("amplitude field is {amplitude_width} bits but samples are {sample_width} bits")]
    SampleWidthMismatch {
        /// Hardware sample width.
        sample_width: u32,
        /// Amplitude field width of the layout.
        amplitude_width: u32,
    },

    /// Samples wider than 32 bits are not supported.
    #[error("sample width {sample_width} exceeds 32 bits")]
    SampleWidthTooLarge {
        /// Requested sample width.
        sample_width: u32,
    },

    /// Too many decimal digits for the slope fraction.
    #[error("fixed-point precision {precision} exceeds the maximum of {max} digits")]
    PrecisionTooHigh {
        /// Requested precision.
        precision: u8,
        /// Largest supported precision.
        max: u8,
    },

    /// The slope field's binary fraction is too coarse for decimal slopes:
    /// packing would move a full-length command by half a sample or more.
    #[error(
        "{frac_bits} fractional slope bits cannot carry {precision}-digit slopes over {max_duration} samples"
    )]
    SlopeResolutionTooCoarse {
        /// Requested precision.
        precision: u8,
        /// Fractional bits of the slope Q-format.
        frac_bits: u32,
        /// Largest duration the layout can carry.
        max_duration: u32,
    },

    /// A batch must contain at least one sample.
    #[error("batch size must be non-zero")]
    ZeroBatchSize,

    /// A full batch must be expressible by a single dense command.
    #[error("batch size {batch_size} exceeds the largest encodable duration {max_duration}")]
    BatchExceedsDuration {
        /// Samples per batch.
        batch_size: u32,
        /// Largest duration the layout can carry.
        max_duration: u32,
    },

    /// The hardware batch width is not a whole number of samples.
    #[error("batch width {batch_width} is not a multiple of the sample width {sample_width}")]
    UnevenBatchWidth {
        /// Batch width in bits.
        batch_width: u32,
        /// Sample width in bits.
        sample_width: u32,
    },
}

/// Errors produced while encoding waypoints or decoding command streams.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CodecError {
    /// A waveform needs a start and an end waypoint.
    #[error("at least two waypoints are required, got {count}")]
    TooFewWaypoints {
        /// Number of waypoints supplied.
        count: usize,
    },

    /// The first waypoint must sit at time zero.
    #[error("first waypoint must be at t = 0, got t = {t}")]
    NonZeroStart {
        /// Time of the first waypoint.
        t: u32,
    },

    /// Two consecutive waypoints do not advance in time.
    #[error("waypoint {index} at t = {t} does not advance past t = {previous}")]
    DegenerateDuration {
        /// Index of the second waypoint of the offending pair.
        index: usize,
        /// Time of the preceding waypoint.
        previous: u32,
        /// Time of the offending waypoint.
        t: u32,
    },

    /// An amplitude does not fit the amplitude field.
    #[error("amplitude {x} at index {index} is outside [{min}, {max}]")]
    AmplitudeOutOfRange {
        /// Index of the offending waypoint or command.
        index: usize,
        /// The amplitude.
        x: i64,
        /// Smallest encodable amplitude.
        min: i64,
        /// Largest encodable amplitude.
        max: i64,
    },

    /// The decoded sample count is not a whole number of batches.
    #[error("uneven waveform: {samples} samples is not a multiple of the batch size {batch_size}")]
    UnevenWaveform {
        /// Total decoded samples.
        samples: u64,
        /// Samples per batch.
        batch_size: u32,
    },

    /// A command breaks the batch alignment rules.
    #[error("batch alignment violated by command {index}: {reason}")]
    BatchAlignmentViolation {
        /// Index of the offending command.
        index: usize,
        /// What went wrong.
        reason: &'static str,
    },

    /// A quantized slope does not fit the slope field.
    #[error("slope {slope} of command {index} does not fit the slope field (raw {raw}, range [{min}, {max}])")]
    QuantizationOverflow {
        /// Index of the offending command.
        index: usize,
        /// The quantized slope.
        slope: QuantizedSlope,
        /// Slope converted to the field's fixed-point format.
        raw: i64,
        /// Smallest raw field value.
        min: i64,
        /// Largest raw field value.
        max: i64,
    },

    /// A duration does not fit the duration field or the time axis.
    #[error("duration {dt} at index {index} exceeds the maximum of {max}")]
    DurationOverflow {
        /// Index of the offending waypoint or command.
        index: usize,
        /// The duration in samples.
        dt: u64,
        /// Largest representable duration.
        max: u64,
    },

    /// A byte stream ends in the middle of a command word.
    #[error("byte stream of {len} bytes is not a multiple of the {word_bytes}-byte word size")]
    TruncatedStream {
        /// Length of the byte stream.
        len: usize,
        /// Bytes per command word.
        word_bytes: usize,
    },

    /// A stream packed with one layout was handed to a codec using another.
    #[error("stream uses the {found:?} layout but the codec expects {expected:?}")]
    LayoutMismatch {
        /// Layout version of the codec.
        expected: crate::config::LayoutVersion,
        /// Layout version of the stream.
        found: crate::config::LayoutVersion,
    },

    /// Invalid configuration.
    #[error("invalid codec configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}
