//! Output formatting for CLI responses

use std::io::Write;
use std::path::Path;

use anyhow::Error;
use colored::*;
use pwl_codec::{CodecConfig, CommandStream, StreamStats};
use serde_json::json;

use crate::error::CliError;

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let error_json = json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "type": error_type_name(error)
        }
    });
    match serde_json::to_string_pretty(&error_json) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Failed to format error as JSON: {}", e),
    }
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

fn error_type_name(error: &Error) -> &'static str {
    match error.downcast_ref::<CliError>() {
        Some(CliError::InvalidInput(_)) => "InvalidInput",
        Some(CliError::InvalidConfiguration(_)) | Some(CliError::Config(_)) => {
            "InvalidConfiguration"
        }
        Some(CliError::Codec(_)) => "Codec",
        Some(CliError::IoError(_)) => "Io",
        Some(CliError::JsonError(_)) => "Json",
        None => "Unknown",
    }
}

/// Write `bytes` to `path`, or stdout when no path is given.
pub fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<(), CliError> {
    match path {
        Some(path) => std::fs::write(path, bytes)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// One zero-padded hex word per line.
pub fn format_hex_words(stream: &CommandStream) -> String {
    let digits = stream.layout().word_bytes() * 2;
    let mut out = String::new();
    for word in stream.words() {
        out.push_str(&format!("{:0digits$x}\n", word, digits = digits));
    }
    out
}

/// SystemVerilog buffer literal, last command first.
pub fn format_sv_stream(stream: &CommandStream) -> String {
    let width = stream.layout().word_width();
    let words: Vec<String> = stream
        .words()
        .iter()
        .rev()
        .map(|word| format!("{}'d{}", width, word))
        .collect();
    format!(
        "localparam BUFF_LEN = {};\nlogic[BUFF_LEN-1:0][{}:0] dma_buff;\nassign dma_buff = {{{}}};\n",
        stream.len(),
        width.saturating_sub(1),
        words.join(", ")
    )
}

/// SystemVerilog expected-sample literal, last sample first.
pub fn format_sv_samples(samples: &[i32]) -> String {
    let values: Vec<String> = samples.iter().rev().map(i32::to_string).collect();
    format!("expc_wave = {{{}}};\n", values.join(","))
}

/// `index,sample` lines with a header.
pub fn format_csv_samples(samples: &[i32]) -> String {
    let mut out = String::from("index,sample\n");
    for (index, sample) in samples.iter().enumerate() {
        out.push_str(&format!("{},{}\n", index, sample));
    }
    out
}

/// Print stream statistics in the requested format
pub fn print_stats(stats: &StreamStats, period: Option<f64>, json: bool) {
    if json {
        let output = json!({
            "success": true,
            "stats": stats,
            "compression_ratio": stats.compression_ratio(),
            "period_secs": period,
        });
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("Failed to format stats as JSON: {}", e),
        }
        return;
    }

    println!("{}", "Stream Statistics:".bold());
    println!(
        "  Commands:      {} ({} dense, {} sparse)",
        stats.commands, stats.dense, stats.sparse
    );
    println!("  Samples:       {} ({} batches)", stats.samples, stats.batches);
    println!(
        "  DMA payload:   {} bytes ({} per word)",
        stats.dma_bytes, stats.word_bytes
    );
    println!("  Playback size: {} bytes", stats.playback_bytes);
    println!("  Raw samples:   {} bytes", stats.raw_sample_bytes);
    println!(
        "  Compression:   {}",
        format!("{:.2}x", stats.compression_ratio()).green()
    );
    if let Some(period) = period {
        println!("  Period:        {:.6} s", period);
    }
}

/// Print the layout presets
pub fn print_layouts(presets: &[(&str, CodecConfig)], json: bool) {
    if json {
        let layouts: Vec<_> = presets
            .iter()
            .map(|(name, config)| json!({ "preset": name, "config": config }))
            .collect();
        let output = json!({ "success": true, "presets": layouts });
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("Failed to format layouts as JSON: {}", e),
        }
        return;
    }

    println!("{}", "Layout Presets:".bold());
    for (name, config) in presets {
        let layout = config.layout();
        println!(
            "  {} ({:?})",
            name.bold(),
            layout.version()
        );
        println!(
            "    Word: {} bits = amplitude {} | slope {} (Q{}.{}) | duration {} | flag 1",
            layout.word_width(),
            layout.amplitude_width(),
            layout.slope_width(),
            layout.slope_width() - layout.slope_frac_bits(),
            layout.slope_frac_bits(),
            layout.duration_width()
        );
        println!(
            "    Batch: {} samples x {} bits, slope precision {} digits",
            config.batch_size(),
            config.sample_width(),
            config.fixed_point_precision()
        );
    }
}
