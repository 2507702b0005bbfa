//! Encode waypoints into a packed command stream

use anyhow::Result;
use pwl_codec::{Codec, PathEncoder, ReferenceEncoder, StreamingEncoder};
use tracing::info;

use crate::commands::{EncodeArgs, EncodeFormat};
use crate::error::CliError;
use crate::input::read_waypoints;
use crate::output;

/// Execute the encode command
pub fn execute(args: &EncodeArgs) -> Result<()> {
    let config = args.codec.resolve()?;
    let waypoints = read_waypoints(&args.input, args.input_format)?;
    let codec = Codec::new(config);

    let encoder: Box<dyn PathEncoder> = if args.reference {
        Box::new(ReferenceEncoder::new(&config))
    } else {
        Box::new(StreamingEncoder::new(&config))
    };
    let stream = codec
        .encode_with(encoder.as_ref(), &waypoints)
        .map_err(CliError::from)?;
    info!(
        encoder = encoder.name(),
        waypoints = waypoints.len(),
        words = stream.len(),
        "encoded waveform"
    );

    let bytes = match args.format {
        EncodeFormat::Hex => output::format_hex_words(&stream).into_bytes(),
        EncodeFormat::Sv => output::format_sv_stream(&stream).into_bytes(),
        EncodeFormat::Bin => stream.to_bytes(),
        EncodeFormat::Json => {
            let mut text = serde_json::to_string_pretty(&stream).map_err(CliError::from)?;
            text.push('\n');
            text.into_bytes()
        }
    };
    output::write_output(args.output.as_deref(), &bytes)?;
    Ok(())
}
