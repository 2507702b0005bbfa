//! pwlctl - piecewise-linear waveform codec CLI
//!
//! Encodes waypoint lists into packed DMA command streams, decodes streams
//! back into samples and reports stream statistics.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod completion;
mod error;
mod input;
mod output;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{DecodeArgs, EncodeArgs, StatsArgs};
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "pwlctl")]
#[command(about = "Piecewise-linear waveform codec - encode, decode and inspect DMA command streams")]
#[command(version)]
#[command(long_about = "
pwlctl converts waypoint lists into the packed command words consumed by a
batch-parallel waveform generator, and expands command streams back into
the samples the hardware will play.

Use --json for machine-readable output suitable for scripting.
")]
struct Cli {
    /// Output format (human-readable or JSON)
    #[arg(
        long,
        global = true,
        help = "Output in JSON format for machine parsing"
    )]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode waypoints into a packed command stream
    Encode(EncodeArgs),

    /// Expand a packed command stream into samples
    Decode(DecodeArgs),

    /// Report command counts, sizes and compression for a waveform
    Stats(StatsArgs),

    /// List the built-in layout presets
    Layouts,

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("pwlctl={},pwl_codec={}", log_level, log_level).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match execute_command(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }

            let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn execute_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Encode(args) => commands::encode::execute(args),
        Commands::Decode(args) => commands::decode::execute(args, cli.json),
        Commands::Stats(args) => commands::stats::execute(args, cli.json),
        Commands::Layouts => commands::layouts::execute(cli.json),
        Commands::Completion { shell } => {
            completion::generate_completion(*shell);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{EncodeFormat, Preset, SampleFormat};
    use crate::input::{StreamFormat, WaypointFormat};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn parse_encode_defaults() -> TestResult {
        let cli = Cli::try_parse_from(["pwlctl", "encode", "wave.json"])?;
        assert!(!cli.json);
        assert_eq!(cli.verbose, 0);
        let Commands::Encode(args) = cli.command else {
            return Err("expected encode".into());
        };
        assert_eq!(args.input.to_str(), Some("wave.json"));
        assert_eq!(args.codec.preset, Preset::Q16);
        assert_eq!(args.input_format, WaypointFormat::Auto);
        assert_eq!(args.format, EncodeFormat::Hex);
        assert!(!args.reference);
        assert!(args.output.is_none());
        Ok(())
    }

    #[test]
    fn parse_encode_options() -> TestResult {
        let cli = Cli::try_parse_from([
            "pwlctl",
            "encode",
            "wave.csv",
            "--preset",
            "legacy",
            "--batch-size",
            "32",
            "--format",
            "sv",
            "--reference",
            "-o",
            "out.sv",
        ])?;
        let Commands::Encode(args) = cli.command else {
            return Err("expected encode".into());
        };
        assert_eq!(args.codec.preset, Preset::Legacy);
        assert_eq!(args.codec.batch_size, Some(32));
        assert_eq!(args.format, EncodeFormat::Sv);
        assert!(args.reference);
        assert_eq!(args.output.as_deref().and_then(|p| p.to_str()), Some("out.sv"));
        Ok(())
    }

    #[test]
    fn parse_decode_with_global_flags_after_subcommand() -> TestResult {
        let cli = Cli::try_parse_from([
            "pwlctl",
            "decode",
            "stream.bin",
            "--input-format",
            "bin",
            "--format",
            "csv",
            "--json",
            "-vv",
        ])?;
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        let Commands::Decode(args) = cli.command else {
            return Err("expected decode".into());
        };
        assert_eq!(args.input_format, StreamFormat::Bin);
        assert_eq!(args.format, SampleFormat::Csv);
        Ok(())
    }

    #[test]
    fn parse_stats_clock() -> TestResult {
        let cli = Cli::try_parse_from(["pwlctl", "stats", "-", "--dac-clock-hz", "1e9"])?;
        let Commands::Stats(args) = cli.command else {
            return Err("expected stats".into());
        };
        assert_eq!(args.dac_clock_hz, Some(1e9));
        Ok(())
    }

    #[test]
    fn unknown_preset_is_rejected() {
        assert!(Cli::try_parse_from(["pwlctl", "encode", "x.json", "--preset", "q8"]).is_err());
    }

    #[test]
    fn missing_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["pwlctl"]).is_err());
    }

    #[test]
    fn parse_completion_shell() -> TestResult {
        let cli = Cli::try_parse_from(["pwlctl", "completion", "zsh"])?;
        assert!(matches!(
            cli.command,
            Commands::Completion {
                shell: clap_complete::Shell::Zsh
            }
        ));
        Ok(())
    }
}
