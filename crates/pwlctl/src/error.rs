//! Error types for pwlctl

use pwl_codec::{CodecError, ConfigError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::InvalidConfiguration(_)
            | CliError::Config(_)
            | CliError::Codec(CodecError::InvalidConfig(_)) => 3,
            CliError::InvalidInput(_) | CliError::Codec(_) | CliError::JsonError(_) => 2,
            CliError::IoError(_) => 1,
        }
    }
}
