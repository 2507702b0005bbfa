//! Command implementations for pwlctl

pub mod decode;
pub mod encode;
pub mod layouts;
pub mod stats;

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use pwl_codec::CodecConfig;
use tracing::debug;

use crate::error::CliError;
use crate::input::{StreamFormat, WaypointFormat};

/// Built-in hardware configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// 64-bit words with a Q16.16 slope
    Q16,
    /// 48-bit words with an integer slope
    Legacy,
}

impl Preset {
    pub fn config(self) -> CodecConfig {
        match self {
            Preset::Q16 => CodecConfig::q16(),
            Preset::Legacy => CodecConfig::legacy(),
        }
    }
}

/// Options selecting the codec configuration
#[derive(Args, Debug, Clone)]
pub struct CodecArgs {
    /// Built-in configuration to start from
    #[arg(long, value_enum, default_value_t = Preset::Q16)]
    pub preset: Preset,

    /// JSON configuration file, overrides --preset
    #[arg(long, value_name = "FILE", env = "PWLCTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the batch size in samples
    #[arg(long)]
    pub batch_size: Option<u32>,
}

impl CodecArgs {
    /// Resolve the effective configuration.
    pub fn resolve(&self) -> Result<CodecConfig, CliError> {
        let base = match &self.config {
            Some(path) => load_config(path)?,
            None => self.preset.config(),
        };
        let config = match self.batch_size {
            Some(batch_size) => base.with_batch_size(batch_size)?,
            None => base,
        };
        debug!(
            batch_size = config.batch_size(),
            layout = ?config.layout().version(),
            "resolved codec configuration"
        );
        Ok(config)
    }
}

fn load_config(path: &Path) -> Result<CodecConfig, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        CliError::InvalidConfiguration(format!("cannot read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&text)
        .map_err(|e| CliError::InvalidConfiguration(format!("{}: {}", path.display(), e)))
}

/// Encoded stream output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EncodeFormat {
    /// One hex word per line
    Hex,
    /// Serialized stream with its layout
    Json,
    /// SystemVerilog `dma_buff` literal
    Sv,
    /// Little-endian bytes
    Bin,
}

/// Decoded sample output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SampleFormat {
    /// JSON array of samples
    Json,
    /// `index,sample` lines
    Csv,
    /// SystemVerilog `expc_wave` literal
    Sv,
}

#[derive(Args, Debug, Clone)]
pub struct EncodeArgs {
    /// Waypoint file (`-` for stdin)
    pub input: PathBuf,

    #[command(flatten)]
    pub codec: CodecArgs,

    /// Waypoint file format
    #[arg(long, value_enum, default_value_t = WaypointFormat::Auto)]
    pub input_format: WaypointFormat,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = EncodeFormat::Hex)]
    pub format: EncodeFormat,

    /// Use the stage-by-stage reference encoder
    #[arg(long)]
    pub reference: bool,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct DecodeArgs {
    /// Command stream file (`-` for stdin)
    pub input: PathBuf,

    #[command(flatten)]
    pub codec: CodecArgs,

    /// Command stream format
    #[arg(long, value_enum, default_value_t = StreamFormat::Hex)]
    pub input_format: StreamFormat,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = SampleFormat::Json)]
    pub format: SampleFormat,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    /// Waypoint file (`-` for stdin)
    pub input: PathBuf,

    #[command(flatten)]
    pub codec: CodecArgs,

    /// Waypoint file format
    #[arg(long, value_enum, default_value_t = WaypointFormat::Auto)]
    pub input_format: WaypointFormat,

    /// DAC sample clock, to report the waveform period
    #[arg(long, value_name = "HZ")]
    pub dac_clock_hz: Option<f64>,
}
