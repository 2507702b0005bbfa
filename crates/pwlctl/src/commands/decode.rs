//! Decode a packed command stream into samples

use anyhow::Result;
use pwl_codec::Decoder;
use tracing::info;

use crate::commands::{DecodeArgs, SampleFormat};
use crate::error::CliError;
use crate::input::read_stream;
use crate::output;

/// Execute the decode command
pub fn execute(args: &DecodeArgs, json: bool) -> Result<()> {
    let config = args.codec.resolve()?;
    let stream = read_stream(&args.input, args.input_format, *config.layout())?;
    let samples = Decoder::new(&config)
        .decode(&stream)
        .map_err(CliError::from)?;
    info!(words = stream.len(), samples = samples.len(), "decoded stream");

    let format = if json { SampleFormat::Json } else { args.format };
    let text = match format {
        SampleFormat::Json => {
            let mut text = serde_json::to_string(&samples).map_err(CliError::from)?;
            text.push('\n');
            text
        }
        SampleFormat::Csv => output::format_csv_samples(&samples),
        SampleFormat::Sv => output::format_sv_samples(&samples),
    };
    output::write_output(args.output.as_deref(), text.as_bytes())?;
    Ok(())
}
