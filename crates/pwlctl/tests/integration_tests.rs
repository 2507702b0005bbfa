//! Integration tests for the pwlctl CLI
//!
//! Each test drives the built binary end to end and checks output and exit
//! codes.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Custom predicate to check if output is valid JSON
fn is_json() -> impl predicates::Predicate<[u8]> {
    predicates::function::function(|s: &[u8]| {
        if let Ok(text) = std::str::from_utf8(s) {
            serde_json::from_str::<Value>(text).is_ok()
        } else {
            false
        }
    })
}

fn pwlctl() -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("pwlctl")?;
    cmd.env_remove("PWLCTL_CONFIG").env_remove("RUST_LOG");
    Ok(cmd)
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> Result<PathBuf, std::io::Error> {
    let path = dir.path().join(name);
    fs::write(&path, contents)?;
    Ok(path)
}

#[test]
fn test_cli_help() -> TestResult {
    pwlctl()?
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("batch-parallel waveform generator"));
    Ok(())
}

#[test]
fn test_cli_version() -> TestResult {
    pwlctl()?
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pwlctl"));
    Ok(())
}

#[test]
fn test_completion_generation() -> TestResult {
    pwlctl()?
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pwlctl"));
    Ok(())
}

#[test]
fn test_encode_ramp_to_hex() -> TestResult {
    let dir = TempDir::new()?;
    let input = write_file(&dir, "ramp.json", "[[0, 0], [32, 32]]")?;

    pwlctl()?
        .arg("encode")
        .arg(&input)
        .assert()
        .success()
        .stdout("0000000100000041\n");
    Ok(())
}

#[test]
fn test_encode_csv_with_legacy_preset() -> TestResult {
    let dir = TempDir::new()?;
    let input = write_file(&dir, "ramp.csv", "x,t\n0,0\n32,32\n")?;

    pwlctl()?
        .arg("encode")
        .arg(&input)
        .args(["--preset", "legacy", "--reference"])
        .assert()
        .success()
        .stdout("000000010041\n");
    Ok(())
}

#[test]
fn test_encode_sv_literal() -> TestResult {
    let dir = TempDir::new()?;
    let input = write_file(&dir, "flat.json", r#"[{"x": 0, "t": 0}, {"x": 0, "t": 64}]"#)?;

    pwlctl()?
        .arg("encode")
        .arg(&input)
        .args(["--format", "sv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("localparam BUFF_LEN = 1;"))
        .stdout(predicate::str::contains("logic[BUFF_LEN-1:0][63:0] dma_buff;"))
        .stdout(predicate::str::contains("assign dma_buff = {64'd129};"));
    Ok(())
}

#[test]
fn test_encode_json_stream() -> TestResult {
    let dir = TempDir::new()?;
    let input = write_file(&dir, "ramp.json", "[[0, 0], [32, 32]]")?;

    pwlctl()?
        .arg("encode")
        .arg(&input)
        .args(["--format", "json"])
        .assert()
        .success()
        .stdout(is_json())
        .stdout(predicate::str::contains("q16x64"));
    Ok(())
}

#[test]
fn test_encode_then_decode_round_trip() -> TestResult {
    let dir = TempDir::new()?;
    let input = write_file(&dir, "fragment.json", "[[0, 0], [10, 10]]")?;
    let stream = dir.path().join("fragment.bin");

    pwlctl()?
        .arg("encode")
        .arg(&input)
        .args(["--format", "bin", "-o"])
        .arg(&stream)
        .assert()
        .success();
    assert_eq!(fs::metadata(&stream)?.len(), 16);

    let output = pwlctl()?
        .arg("decode")
        .arg(&stream)
        .args(["--input-format", "bin"])
        .output()?;
    assert!(output.status.success());
    let samples: Vec<i32> = serde_json::from_slice(&output.stdout)?;
    let expected: Vec<i32> = (0..10).chain(std::iter::repeat_n(10, 6)).collect();
    assert_eq!(samples, expected);
    Ok(())
}

#[test]
fn test_decode_hex_to_csv() -> TestResult {
    let dir = TempDir::new()?;
    let stream = write_file(&dir, "ramp.hex", "0x0000000100000041\n")?;

    pwlctl()?
        .arg("decode")
        .arg(&stream)
        .args(["--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("index,sample\n0,0\n1,1\n"))
        .stdout(predicate::str::ends_with("31,31\n"));
    Ok(())
}

#[test]
fn test_decode_uneven_stream_fails() -> TestResult {
    let dir = TempDir::new()?;
    // one dense flat command of 9 samples
    let stream = write_file(&dir, "short.hex", "0000000000000012\n")?;

    pwlctl()?
        .arg("decode")
        .arg(&stream)
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Error:"));
    Ok(())
}

#[test]
fn test_stats_json() -> TestResult {
    let dir = TempDir::new()?;
    let input = write_file(&dir, "flat.json", "[[7, 0], [7, 70000]]")?;

    let output = pwlctl()?
        .args(["--json", "stats"])
        .arg(&input)
        .args(["--dac-clock-hz", "1000000"])
        .output()?;
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["success"], true);
    assert_eq!(report["stats"]["commands"], 3);
    assert_eq!(report["stats"]["sparse"], 3);
    assert_eq!(report["stats"]["samples"], 70_000);
    assert_eq!(report["period_secs"], 0.07);
    Ok(())
}

#[test]
fn test_stats_human() -> TestResult {
    let dir = TempDir::new()?;
    let input = write_file(&dir, "ramp.json", "[[0, 0], [32, 32]]")?;

    pwlctl()?
        .arg("stats")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Stream Statistics"))
        .stdout(predicate::str::contains("1 sparse"));
    Ok(())
}

#[test]
fn test_layouts_json() -> TestResult {
    pwlctl()?
        .args(["layouts", "--json"])
        .assert()
        .success()
        .stdout(is_json())
        .stdout(predicate::str::contains("legacy48"))
        .stdout(predicate::str::contains("q16x64"));
    Ok(())
}

#[test]
fn test_degenerate_waypoint_exit_code() -> TestResult {
    let dir = TempDir::new()?;
    let input = write_file(&dir, "bad.json", "[[0, 0], [5, 10], [6, 10]]")?;

    pwlctl()?
        .args(["--json", "encode"])
        .arg(&input)
        .assert()
        .failure()
        .code(2)
        .stdout(is_json())
        .stdout(predicate::str::contains("Codec"));
    Ok(())
}

#[test]
fn test_malformed_waypoints_exit_code() -> TestResult {
    let dir = TempDir::new()?;
    let input = write_file(&dir, "bad.json", "{not json")?;

    pwlctl()?
        .arg("encode")
        .arg(&input)
        .assert()
        .failure()
        .code(2);
    Ok(())
}

#[test]
fn test_bad_config_exit_code() -> TestResult {
    let dir = TempDir::new()?;
    let input = write_file(&dir, "ramp.json", "[[0, 0], [32, 32]]")?;

    pwlctl()?
        .arg("encode")
        .arg(&input)
        .args(["--batch-size", "0"])
        .assert()
        .failure()
        .code(3);

    let config = write_file(&dir, "config.json", r#"{"batch_size": "sixteen"}"#)?;
    pwlctl()?
        .arg("encode")
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .code(3);
    Ok(())
}

#[test]
fn test_config_with_unpackable_precision_exit_code() -> TestResult {
    let dir = TempDir::new()?;
    let input = write_file(&dir, "ramp.json", "[[0, 0], [5, 10], [0, 16]]")?;
    let config = write_file(
        &dir,
        "config.json",
        r#"{
            "batch_size": 16,
            "sample_width": 16,
            "fixed_point_precision": 8,
            "layout": {
                "version": "legacy48",
                "word_width": 48,
                "amplitude_width": 16,
                "slope_width": 16,
                "slope_frac_bits": 0,
                "duration_width": 15
            }
        }"#,
    )?;

    pwlctl()?
        .arg("encode")
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("fractional slope bits"));
    Ok(())
}

#[test]
fn test_csv_malformed_first_row_exit_code() -> TestResult {
    let dir = TempDir::new()?;
    let input = write_file(&dir, "ramp.csv", "abc,5\n0,0\n32,32\n")?;

    pwlctl()?
        .arg("encode")
        .arg(&input)
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("line 1"));
    Ok(())
}

#[test]
fn test_missing_input_file() -> TestResult {
    pwlctl()?
        .args(["encode", "/nonexistent/wave.json"])
        .assert()
        .failure()
        .code(1);
    Ok(())
}
