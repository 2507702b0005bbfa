//! Report size and timing figures for a waveform

use anyhow::Result;
use pwl_codec::{Codec, StreamStats};

use crate::commands::StatsArgs;
use crate::error::CliError;
use crate::input::read_waypoints;
use crate::output;

/// Execute the stats command
pub fn execute(args: &StatsArgs, json: bool) -> Result<()> {
    let config = args.codec.resolve()?;
    let waypoints = read_waypoints(&args.input, args.input_format)?;
    let commands = Codec::new(config)
        .commands(&waypoints)
        .map_err(CliError::from)?;

    let stats = StreamStats::from_commands(&commands, &config);
    let period = args.dac_clock_hz.and_then(|hz| stats.period_secs(hz));
    output::print_stats(&stats, period, json);
    Ok(())
}
