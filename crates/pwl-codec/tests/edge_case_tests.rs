//! Edge cases: extreme amplitudes, long runs, tiny slopes and malformed
//! streams.

use pwl_codec::{
    Codec, CodecConfig, CodecError, Command, CommandStream, Decoder, LayoutVersion, PathEncoder,
    QuantizedSlope, ReferenceEncoder, StreamStats, Tag, WordLayout, Waypoint,
};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn points(raw: &[(i32, u32)]) -> Vec<Waypoint> {
    raw.iter().copied().map(Waypoint::from).collect()
}

#[test]
fn full_scale_swings_stay_in_range() -> TestResult {
    let codec = Codec::new(CodecConfig::q16());
    let waypoints = points(&[(-32768, 0), (32767, 16), (-32768, 32)]);
    let commands = codec.commands(&waypoints)?;
    assert_eq!(commands.len(), 2);
    assert!(commands.iter().all(Command::is_sparse));

    let samples = codec.decode(&codec.encode(&waypoints)?)?;
    assert_eq!(samples.first(), Some(&-32768));
    assert_eq!(samples.get(16), Some(&32767));
    assert!(samples.iter().all(|s| (-32768..=32767).contains(s)));
    Ok(())
}

#[test]
fn long_flat_run_is_chunked() -> TestResult {
    let config = CodecConfig::q16();
    let codec = Codec::new(config);
    let waypoints = points(&[(7, 0), (7, 70_000)]);
    let commands = codec.commands(&waypoints)?;
    let durations: Vec<u32> = commands.iter().map(|c| c.dt).collect();
    assert_eq!(durations, vec![32_752, 32_752, 4_496]);
    assert!(commands.iter().all(|c| c.is_sparse() && c.x == 7));

    let samples = codec.decode(&codec.encode(&waypoints)?)?;
    assert_eq!(samples.len(), 70_000);
    assert!(samples.iter().all(|s| *s == 7));

    let stats = StreamStats::from_commands(&commands, &config);
    assert_eq!(stats.sparse, 3);
    assert_eq!(stats.batches, 4_375);
    assert!(stats.compression_ratio() > 1000.0);
    Ok(())
}

#[test]
fn slow_ramp_keeps_a_fractional_slope() -> TestResult {
    let codec = Codec::new(CodecConfig::q16());
    let waypoints = points(&[(0, 0), (5, 70_000)]);
    let commands = codec.commands(&waypoints)?;
    let first = commands.first().ok_or("no commands")?;
    assert_eq!(first.slope.ticks(), 7_142);

    let samples = codec.decode(&codec.encode(&waypoints)?)?;
    assert_eq!(samples.first(), Some(&0));
    assert!(samples.iter().all(|s| (0..=5).contains(s)));
    Ok(())
}

#[test]
fn shallow_ramp_tracks_its_line_across_chunks() -> TestResult {
    let codec = Codec::new(CodecConfig::q16());
    let waypoints = points(&[(0, 0), (100, 2_500_000), (0, 2_500_016)]);
    let commands = codec.commands(&waypoints)?;
    assert!(commands.len() > 70);

    let samples = codec.decode(&codec.encode(&waypoints)?)?;
    assert_eq!(samples.len(), 2_500_016);
    for (t, sample) in samples.iter().take(2_500_000).enumerate() {
        let t = i64::try_from(t)?;
        // |sample - 100 * t / 2_500_000| <= 2, scaled by the span length
        let error = i64::from(*sample) * 2_500_000 - 100 * t;
        assert!(error.abs() <= 2 * 2_500_000, "sample {sample} at t={t}");
    }
    assert!(samples.get(2_499_999).is_some_and(|s| *s >= 99));
    assert_eq!(samples.get(2_500_000), Some(&100));
    Ok(())
}

#[test]
fn equal_slopes_that_miss_a_waypoint_stay_apart() -> TestResult {
    let config = CodecConfig::legacy();
    let three = QuantizedSlope::from_ticks(3, 0);
    let waypoints = points(&[(0, 0), (7, 2), (13, 4), (13, 16)]);
    let commands = ReferenceEncoder::new(&config).encode_commands(&waypoints)?;
    assert_eq!(
        commands,
        vec![
            Command::dense(0, three, 2),
            Command::dense(7, three, 2),
            Command::dense(13, QuantizedSlope::flat(0), 12),
        ]
    );

    let codec = Codec::new(config);
    let samples = codec.decode(&codec.encode(&waypoints)?)?;
    let expected: Vec<i32> = [0, 3, 7, 10].into_iter().chain(std::iter::repeat_n(13, 12)).collect();
    assert_eq!(samples, expected);
    Ok(())
}

#[test]
fn one_tick_spans_each_start_on_their_waypoint() -> TestResult {
    // Both spans quantize to the one-tick minimum slope.
    let codec = Codec::new(CodecConfig::q16());
    let waypoints = points(&[(0, 0), (2, 140_000_000), (3, 280_000_000)]);
    let commands = codec.commands(&waypoints)?;

    let mut start: u64 = 0;
    let mut opened = Vec::new();
    for command in &commands {
        if start == 140_000_000 {
            opened.push(command.x);
        }
        start += u64::from(command.dt);
    }
    assert_eq!(start, 280_000_000);
    assert_eq!(opened, vec![2]);
    Ok(())
}

#[test]
fn tiny_slope_overshoot_is_corrected() -> TestResult {
    let config = CodecConfig::legacy();
    let waypoints = points(&[(0, 0), (2, 10), (2, 16)]);
    let commands = ReferenceEncoder::new(&config).encode_commands(&waypoints)?;
    assert_eq!(
        commands,
        vec![
            Command::dense(0, QuantizedSlope::from_ticks(1, 0), 2),
            Command::dense(2, QuantizedSlope::flat(0), 14),
        ]
    );

    let codec = Codec::new(config);
    let samples = codec.decode(&codec.encode(&waypoints)?)?;
    assert_eq!(samples.get(10), Some(&2));
    assert!(samples.iter().all(|s| *s <= 2));
    Ok(())
}

#[test]
fn single_exact_batch_needs_no_padding() -> TestResult {
    let codec = Codec::new(CodecConfig::q16());
    let commands = codec.commands(&points(&[(3, 0), (-13, 16)]))?;
    assert_eq!(commands.len(), 1);
    assert!(commands.iter().all(|c| c.tag == Tag::Sparse && c.dt == 16));
    Ok(())
}

#[test]
fn wide_batches_from_batch_width() -> TestResult {
    let config = CodecConfig::from_batch_width(1024, 16, 8, WordLayout::q16x64())?;
    let codec = Codec::new(config);
    let waypoints = points(&[(0, 0), (100, 100), (0, 130)]);
    let samples = codec.decode(&codec.encode(&waypoints)?)?;
    assert_eq!(samples.len(), 192);
    assert_eq!(samples.get(100), Some(&100));
    assert_eq!(samples.get(130), Some(&0));
    Ok(())
}

#[test]
fn uneven_stream_fails_to_decode() -> TestResult {
    let config = CodecConfig::q16();
    let stream = pwl_codec::CommandPacker::new(&config)
        .pack_all(&[Command::dense(0, QuantizedSlope::flat(8), 9)])?;
    assert_eq!(
        Decoder::new(&config).decode(&stream),
        Err(CodecError::UnevenWaveform {
            samples: 9,
            batch_size: 16
        })
    );
    Ok(())
}

#[test]
fn misaligned_stream_fails_to_decode() -> TestResult {
    let config = CodecConfig::q16();
    let flat = QuantizedSlope::flat(8);
    let stream = pwl_codec::CommandPacker::new(&config)
        .pack_all(&[Command::dense(0, flat, 8), Command::sparse(0, flat, 24)])?;
    assert!(matches!(
        Decoder::new(&config).decode(&stream),
        Err(CodecError::BatchAlignmentViolation { index: 1, .. })
    ));
    Ok(())
}

#[test]
fn byte_stream_round_trip() -> TestResult {
    let codec = Codec::new(CodecConfig::legacy());
    let waypoints = points(&[(0, 0), (-300, 21), (40, 77)]);
    let stream = codec.encode(&waypoints)?;
    let bytes = stream.to_bytes();
    assert_eq!(bytes.len(), stream.len() * 6);

    let parsed = CommandStream::from_bytes(WordLayout::legacy48(), &bytes)?;
    assert_eq!(codec.decode(&parsed)?, codec.decode(&stream)?);

    let ragged = bytes.get(..bytes.len() - 1).ok_or("empty stream")?;
    assert!(matches!(
        CommandStream::from_bytes(WordLayout::legacy48(), ragged),
        Err(CodecError::TruncatedStream { word_bytes: 6, .. })
    ));
    Ok(())
}

#[test]
fn stream_serializes_with_its_layout() -> TestResult {
    let codec = Codec::new(CodecConfig::q16());
    let stream = codec.encode(&points(&[(0, 0), (32, 32)]))?;
    let json = serde_json::to_string(&stream)?;
    assert!(json.contains("q16x64"));
    let back: CommandStream = serde_json::from_str(&json)?;
    assert_eq!(back, stream);
    assert_eq!(back.layout().version(), LayoutVersion::Q16x64);
    Ok(())
}

#[test]
fn out_of_range_waypoint_is_rejected() {
    let codec = Codec::new(CodecConfig::q16());
    assert!(matches!(
        codec.encode(&points(&[(0, 0), (32_768, 16)])),
        Err(CodecError::AmplitudeOutOfRange { index: 1, .. })
    ));
    assert!(matches!(
        codec.encode(&points(&[(0, 4), (1, 16)])),
        Err(CodecError::NonZeroStart { t: 4 })
    ));
    assert!(matches!(
        codec.encode(&points(&[(0, 0)])),
        Err(CodecError::TooFewWaypoints { count: 1 })
    ));
}
