//! Size and timing figures for an encoded waveform.

use serde::Serialize;

use crate::command::Command;
use crate::config::CodecConfig;

/// Summary of a command list under a given configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreamStats {
    /// Total commands.
    pub commands: usize,
    /// Dense commands.
    pub dense: usize,
    /// Sparse commands.
    pub sparse: usize,
    /// Samples generated on playback.
    pub samples: u64,
    /// Whole batches generated on playback.
    pub batches: u64,
    /// Bytes per serialized word.
    pub word_bytes: usize,
    /// Bytes transferred to the device.
    pub dma_bytes: u64,
    /// Playback memory footprint: a full batch per dense command, one word
    /// per sparse command.
    pub playback_bytes: u64,
    /// Bytes of the equivalent uncompressed sample buffer.
    pub raw_sample_bytes: u64,
}

impl StreamStats {
    /// Compute statistics for `commands`.
    pub fn from_commands(commands: &[Command], config: &CodecConfig) -> Self {
        let sparse = commands.iter().filter(|c| c.is_sparse()).count();
        let dense = commands.len() - sparse;
        let samples: u64 = commands.iter().map(|c| u64::from(c.dt)).sum();
        let word_bytes = config.layout().word_bytes();
        let word_width = u64::from(config.layout().word_width());

        let dense_bits = (dense as u64).saturating_mul(config.batch_width());
        let sparse_bits = (sparse as u64).saturating_mul(word_width);

        Self {
            commands: commands.len(),
            dense,
            sparse,
            samples,
            batches: samples / u64::from(config.batch_size()),
            word_bytes,
            dma_bytes: (commands.len() as u64).saturating_mul(word_bytes as u64),
            playback_bytes: dense_bits.saturating_add(sparse_bits) / 8,
            raw_sample_bytes: samples
                .saturating_mul(u64::from(config.sample_width()))
                .div_ceil(8),
        }
    }

    /// Uncompressed size over transferred size. Zero for an empty stream.
    pub fn compression_ratio(&self) -> f64 {
        if self.dma_bytes == 0 {
            return 0.0;
        }
        self.raw_sample_bytes as f64 / self.dma_bytes as f64
    }

    /// Waveform period at a DAC clock of `dac_clock_hz`, if the clock is
    /// positive.
    pub fn period_secs(&self, dac_clock_hz: f64) -> Option<f64> {
        (dac_clock_hz > 0.0 && dac_clock_hz.is_finite()).then(|| self.samples as f64 / dac_clock_hz)
    }
}
