//! Waypoint and command-stream readers

use std::io::Read;
use std::path::Path;

use clap::ValueEnum;
use pwl_codec::{CommandStream, Waypoint, WordLayout};
use serde::Deserialize;

use crate::error::CliError;

/// Waypoint file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WaypointFormat {
    /// Pick from the file extension, JSON unless it ends in `.csv`
    Auto,
    /// `[{"x": 0, "t": 0}, ...]` or `[[0, 0], ...]`
    Json,
    /// One `x,t` pair per line
    Csv,
}

/// Command-stream file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StreamFormat {
    /// Hexadecimal words separated by whitespace or commas
    Hex,
    /// Little-endian words, `ceil(word_width / 8)` bytes each
    Bin,
    /// A serialized stream as written by `encode --format json`
    Json,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawWaypoint {
    Object { x: i32, t: u32 },
    Pair(i32, u32),
}

impl From<RawWaypoint> for Waypoint {
    fn from(raw: RawWaypoint) -> Self {
        match raw {
            RawWaypoint::Object { x, t } | RawWaypoint::Pair(x, t) => Waypoint::new(x, t),
        }
    }
}

/// Read a whole file, or stdin for `-`.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>, CliError> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        return Ok(buf);
    }
    Ok(std::fs::read(path)?)
}

fn read_text(path: &Path) -> Result<String, CliError> {
    String::from_utf8(read_bytes(path)?)
        .map_err(|e| CliError::InvalidInput(format!("{} is not UTF-8: {}", path.display(), e)))
}

/// Read a waypoint file.
pub fn read_waypoints(path: &Path, format: WaypointFormat) -> Result<Vec<Waypoint>, CliError> {
    let format = match format {
        WaypointFormat::Auto => {
            let is_csv = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if is_csv {
                WaypointFormat::Csv
            } else {
                WaypointFormat::Json
            }
        }
        other => other,
    };
    let text = read_text(path)?;
    match format {
        WaypointFormat::Csv => parse_waypoints_csv(&text),
        _ => parse_waypoints_json(&text),
    }
}

/// Parse a JSON waypoint list.
pub fn parse_waypoints_json(text: &str) -> Result<Vec<Waypoint>, CliError> {
    let raw: Vec<RawWaypoint> = serde_json::from_str(text)
        .map_err(|e| CliError::InvalidInput(format!("waypoint JSON: {}", e)))?;
    Ok(raw.into_iter().map(Waypoint::from).collect())
}

/// Parse `x,t` lines. Blank lines and `#` comments are skipped, and so is
/// the first remaining line when neither of its fields is a number.
pub fn parse_waypoints_csv(text: &str) -> Result<Vec<Waypoint>, CliError> {
    let mut waypoints = Vec::new();
    let mut first = true;
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let may_be_header = std::mem::replace(&mut first, false);
        let mut fields = line.split(',').map(str::trim);
        let (Some(x), Some(t), None) = (fields.next(), fields.next(), fields.next()) else {
            return Err(CliError::InvalidInput(format!(
                "line {}: expected `x,t`, got `{}`",
                number + 1,
                line
            )));
        };
        match (x.parse::<i32>(), t.parse::<u32>()) {
            (Ok(x), Ok(t)) => waypoints.push(Waypoint::new(x, t)),
            _ if may_be_header && x.parse::<f64>().is_err() && t.parse::<f64>().is_err() => {
                continue;
            }
            _ => {
                return Err(CliError::InvalidInput(format!(
                    "line {}: `{}` is not an integer amplitude and time",
                    number + 1,
                    line
                )));
            }
        }
    }
    Ok(waypoints)
}

/// Read a packed command stream.
pub fn read_stream(
    path: &Path,
    format: StreamFormat,
    layout: WordLayout,
) -> Result<CommandStream, CliError> {
    match format {
        StreamFormat::Bin => Ok(CommandStream::from_bytes(layout, &read_bytes(path)?)?),
        StreamFormat::Hex => parse_hex_stream(&read_text(path)?, layout),
        StreamFormat::Json => serde_json::from_str(&read_text(path)?)
            .map_err(|e| CliError::InvalidInput(format!("stream JSON: {}", e))),
    }
}

/// Parse whitespace- or comma-separated hex words, with optional `0x`.
pub fn parse_hex_stream(text: &str, layout: WordLayout) -> Result<CommandStream, CliError> {
    let words = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| {
            let digits = token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token);
            u64::from_str_radix(digits, 16)
                .map_err(|e| CliError::InvalidInput(format!("bad hex word `{}`: {}", token, e)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CommandStream::new(layout, words))
}
