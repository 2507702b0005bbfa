//! Codec configuration and versioned command-word layouts.
//!
//! The playback engine fixes the batch size, the sample width and the bit
//! layout of a command word. Different hardware revisions chose different
//! values, so none of them are constants here: every encoder and decoder is
//! built from a validated [`CodecConfig`].

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Largest supported number of decimal digits in a slope fraction.
pub const MAX_PRECISION: u8 = 9;

/// Hardware revision a [`WordLayout`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutVersion {
    /// 48-bit words: 16-bit amplitude, 16-bit integer slope, 15-bit duration.
    Legacy48,
    /// 64-bit words: 16-bit amplitude, Q16.16 slope, 15-bit duration.
    Q16x64,
    /// Any other validated layout.
    Custom,
}

/// Bit layout of a packed command word.
///
/// From the most significant end: amplitude, slope, duration, sparse flag.
/// The sparse flag always occupies bit 0 and the duration starts at bit 1.
/// Unused high bits of the word are zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawWordLayout")]
pub struct WordLayout {
    version: LayoutVersion,
    word_width: u32,
    amplitude_width: u32,
    slope_width: u32,
    slope_frac_bits: u32,
    duration_width: u32,
}

#[derive(Deserialize)]
struct RawWordLayout {
    #[serde(default = "custom_version")]
    version: LayoutVersion,
    word_width: u32,
    amplitude_width: u32,
    slope_width: u32,
    slope_frac_bits: u32,
    duration_width: u32,
}

fn custom_version() -> LayoutVersion {
    LayoutVersion::Custom
}

impl TryFrom<RawWordLayout> for WordLayout {
    type Error = ConfigError;

    fn try_from(raw: RawWordLayout) -> Result<Self, Self::Error> {
        let layout = Self {
            version: raw.version,
            word_width: raw.word_width,
            amplitude_width: raw.amplitude_width,
            slope_width: raw.slope_width,
            slope_frac_bits: raw.slope_frac_bits,
            duration_width: raw.duration_width,
        };
        layout.validate()?;
        Ok(layout)
    }
}

impl WordLayout {
    /// The 48-bit layout of the first hardware revision (integer slopes).
    pub const fn legacy48() -> Self {
        Self {
            version: LayoutVersion::Legacy48,
            word_width: 48,
            amplitude_width: 16,
            slope_width: 16,
            slope_frac_bits: 0,
            duration_width: 15,
        }
    }

    /// The 64-bit layout with a Q16.16 slope.
    pub const fn q16x64() -> Self {
        Self {
            version: LayoutVersion::Q16x64,
            word_width: 64,
            amplitude_width: 16,
            slope_width: 32,
            slope_frac_bits: 16,
            duration_width: 15,
        }
    }

    /// Build and validate a custom layout.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a width is zero, the fields do not fit
    /// the word, or the word is wider than 64 bits.
    pub fn custom(
        word_width: u32,
        amplitude_width: u32,
        slope_width: u32,
        slope_frac_bits: u32,
        duration_width: u32,
    ) -> Result<Self, ConfigError> {
        let layout = Self {
            version: LayoutVersion::Custom,
            word_width,
            amplitude_width,
            slope_width,
            slope_frac_bits,
            duration_width,
        };
        layout.validate()?;
        Ok(layout)
    }

    /// Look up the layout of a known hardware revision.
    pub fn for_version(version: LayoutVersion) -> Option<Self> {
        match version {
            LayoutVersion::Legacy48 => Some(Self::legacy48()),
            LayoutVersion::Q16x64 => Some(Self::q16x64()),
            LayoutVersion::Custom => None,
        }
    }

    /// Check the structural rules of the layout.
    ///
    /// # Errors
    ///
    /// See [`WordLayout::custom`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, width) in [
            ("word_width", self.word_width),
            ("amplitude_width", self.amplitude_width),
            ("slope_width", self.slope_width),
            ("duration_width", self.duration_width),
        ] {
            if width == 0 {
                return Err(ConfigError::ZeroWidth { field });
            }
        }
        if self.word_width > 64 {
            return Err(ConfigError::WordTooWide {
                word_width: self.word_width,
            });
        }
        if self.duration_width > 32 {
            return Err(ConfigError::DurationFieldTooWide {
                duration_width: self.duration_width,
            });
        }
        let used = self.used_bits();
        if used > self.word_width {
            return Err(ConfigError::FieldsExceedWord {
                used,
                word_width: self.word_width,
            });
        }
        if self.slope_frac_bits >= self.slope_width {
            return Err(ConfigError::SlopeFractionTooWide {
                frac_bits: self.slope_frac_bits,
                slope_width: self.slope_width,
            });
        }
        Ok(())
    }

    /// Hardware revision of this layout.
    pub fn version(&self) -> LayoutVersion {
        self.version
    }

    /// Total word width in bits.
    pub fn word_width(&self) -> u32 {
        self.word_width
    }

    /// Amplitude field width in bits.
    pub fn amplitude_width(&self) -> u32 {
        self.amplitude_width
    }

    /// Slope field width in bits, sign included.
    pub fn slope_width(&self) -> u32 {
        self.slope_width
    }

    /// Fractional bits of the slope Q-format.
    pub fn slope_frac_bits(&self) -> u32 {
        self.slope_frac_bits
    }

    /// Duration field width in bits, sparse flag excluded.
    pub fn duration_width(&self) -> u32 {
        self.duration_width
    }

    /// Bits consumed by all fields including the sparse flag.
    pub fn used_bits(&self) -> u32 {
        self.amplitude_width
            .saturating_add(self.slope_width)
            .saturating_add(self.duration_width)
            .saturating_add(1)
    }

    /// Bit offset of the duration field.
    pub fn duration_shift(&self) -> u32 {
        1
    }

    /// Bit offset of the slope field.
    pub fn slope_shift(&self) -> u32 {
        self.duration_width.saturating_add(1)
    }

    /// Bit offset of the amplitude field.
    pub fn amplitude_shift(&self) -> u32 {
        self.slope_shift().saturating_add(self.slope_width)
    }

    /// Bytes per word in a serialized stream.
    pub fn word_bytes(&self) -> usize {
        self.word_width.div_ceil(8) as usize
    }

    /// Largest duration a single command can carry.
    pub fn max_duration(&self) -> u32 {
        low_mask(self.duration_width).try_into().unwrap_or(u32::MAX)
    }

    /// Inclusive range of the amplitude field.
    pub fn amplitude_range(&self) -> (i64, i64) {
        signed_range(self.amplitude_width)
    }

    /// Inclusive range of the raw slope field.
    pub fn slope_range(&self) -> (i64, i64) {
        signed_range(self.slope_width)
    }
}

impl Default for WordLayout {
    fn default() -> Self {
        Self::q16x64()
    }
}

/// Mask covering the low `width` bits.
pub(crate) fn low_mask(width: u32) -> u64 {
    match width {
        0 => 0,
        w if w >= 64 => u64::MAX,
        w => (1u64 << w) - 1,
    }
}

/// Inclusive two's-complement range of a `width`-bit field.
pub(crate) fn signed_range(width: u32) -> (i64, i64) {
    match width {
        0 => (0, 0),
        w if w >= 64 => (i64::MIN, i64::MAX),
        w => {
            let half = 1i64 << (w - 1);
            (-half, half - 1)
        }
    }
}

/// Complete codec configuration, agreed with the consuming hardware.
///
/// # Example
///
/// ```
/// use pwl_codec::{CodecConfig, WordLayout};
///
/// // 256-bit batches of 16-bit samples, Q16.16 slopes.
/// let config = CodecConfig::from_batch_width(256, 16, 8, WordLayout::q16x64())?;
/// assert_eq!(config.batch_size(), 16);
/// # Ok::<(), pwl_codec::ConfigError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawCodecConfig")]
pub struct CodecConfig {
    batch_size: u32,
    sample_width: u32,
    fixed_point_precision: u8,
    layout: WordLayout,
}

#[derive(Deserialize)]
struct RawCodecConfig {
    batch_size: u32,
    sample_width: u32,
    fixed_point_precision: u8,
    layout: WordLayout,
}

impl TryFrom<RawCodecConfig> for CodecConfig {
    type Error = ConfigError;

    fn try_from(raw: RawCodecConfig) -> Result<Self, Self::Error> {
        Self::new(
            raw.batch_size,
            raw.sample_width,
            raw.fixed_point_precision,
            raw.layout,
        )
    }
}

impl CodecConfig {
    /// Build and validate a configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the layout is invalid, the amplitude
    /// field does not match the sample width, the precision is too high or
    /// finer than the slope field can carry, or a full batch cannot be
    /// carried by one command.
    pub fn new(
        batch_size: u32,
        sample_width: u32,
        fixed_point_precision: u8,
        layout: WordLayout,
    ) -> Result<Self, ConfigError> {
        layout.validate()?;
        if sample_width == 0 {
            return Err(ConfigError::ZeroWidth {
                field: "sample_width",
            });
        }
        if sample_width > 32 {
            return Err(ConfigError::SampleWidthTooLarge { sample_width });
        }
        if layout.amplitude_width() != sample_width {
            return Err(ConfigError::SampleWidthMismatch {
                sample_width,
                amplitude_width: layout.amplitude_width(),
            });
        }
        if fixed_point_precision > MAX_PRECISION {
            return Err(ConfigError::PrecisionTooHigh {
                precision: fixed_point_precision,
                max: MAX_PRECISION,
            });
        }
        // Fractional slopes are rounded to 2^-frac_bits on packing. That
        // error, accumulated over the longest command, must stay under half
        // a sample.
        let resolution = 1u64
            .checked_shl(layout.slope_frac_bits())
            .unwrap_or(u64::MAX);
        if fixed_point_precision > 0 && resolution <= u64::from(layout.max_duration()) {
            return Err(ConfigError::SlopeResolutionTooCoarse {
                precision: fixed_point_precision,
                frac_bits: layout.slope_frac_bits(),
                max_duration: layout.max_duration(),
            });
        }
        if batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if batch_size > layout.max_duration() {
            return Err(ConfigError::BatchExceedsDuration {
                batch_size,
                max_duration: layout.max_duration(),
            });
        }
        Ok(Self {
            batch_size,
            sample_width,
            fixed_point_precision,
            layout,
        })
    }

    /// Derive the batch size from the hardware batch width in bits.
    ///
    /// # Errors
    ///
    /// Fails when `batch_width` is not a whole number of samples, plus every
    /// case of [`CodecConfig::new`].
    pub fn from_batch_width(
        batch_width: u32,
        sample_width: u32,
        fixed_point_precision: u8,
        layout: WordLayout,
    ) -> Result<Self, ConfigError> {
        if sample_width == 0 {
            return Err(ConfigError::ZeroWidth {
                field: "sample_width",
            });
        }
        if batch_width % sample_width != 0 {
            return Err(ConfigError::UnevenBatchWidth {
                batch_width,
                sample_width,
            });
        }
        Self::new(
            batch_width / sample_width,
            sample_width,
            fixed_point_precision,
            layout,
        )
    }

    /// Q16.16 slopes in 64-bit words, 16-sample batches, 8 decimal digits.
    pub const fn q16() -> Self {
        Self {
            batch_size: 16,
            sample_width: 16,
            fixed_point_precision: 8,
            layout: WordLayout::q16x64(),
        }
    }

    /// Integer slopes in 48-bit words, 16-sample batches.
    pub const fn legacy() -> Self {
        Self {
            batch_size: 16,
            sample_width: 16,
            fixed_point_precision: 0,
            layout: WordLayout::legacy48(),
        }
    }

    /// Same configuration with a different batch size.
    ///
    /// # Errors
    ///
    /// See [`CodecConfig::new`].
    pub fn with_batch_size(self, batch_size: u32) -> Result<Self, ConfigError> {
        Self::new(
            batch_size,
            self.sample_width,
            self.fixed_point_precision,
            self.layout,
        )
    }

    /// Samples per playback batch.
    pub fn batch_size(&self) -> u32 {
        self.batch_size
    }

    /// Bits per amplitude sample.
    pub fn sample_width(&self) -> u32 {
        self.sample_width
    }

    /// Decimal digits kept in the slope fraction.
    pub fn fixed_point_precision(&self) -> u8 {
        self.fixed_point_precision
    }

    /// Packing layout.
    pub fn layout(&self) -> &WordLayout {
        &self.layout
    }

    /// Hardware batch width in bits.
    pub fn batch_width(&self) -> u64 {
        u64::from(self.batch_size) * u64::from(self.sample_width)
    }

    /// Inclusive amplitude range of a sample.
    pub fn amplitude_range(&self) -> (i64, i64) {
        self.layout.amplitude_range()
    }

    /// Longest sparse command: the largest multiple of the batch size that
    /// fits the duration field.
    pub fn max_sparse_duration(&self) -> u32 {
        let max = self.layout.max_duration();
        max - max % self.batch_size
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::q16()
    }
}
