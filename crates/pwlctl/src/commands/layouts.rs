//! List the built-in layout presets

use anyhow::Result;

use crate::commands::Preset;
use crate::output;

/// Execute the layouts command
pub fn execute(json: bool) -> Result<()> {
    let presets = [
        ("q16", Preset::Q16.config()),
        ("legacy", Preset::Legacy.config()),
    ];
    output::print_layouts(&presets, json);
    Ok(())
}
