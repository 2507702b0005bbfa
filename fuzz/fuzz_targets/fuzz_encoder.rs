//! Fuzzes the full encode and decode pipeline.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_encoder
#![no_main]
use libfuzzer_sys::fuzz_target;
use pwl_codec::{
    Codec, CodecConfig, PathEncoder, ReferenceEncoder, StreamingEncoder, Waypoint,
};

fuzz_target!(|data: &[u8]| {
    // Three bytes per waypoint: amplitude (i16) and a step of 1..=256 samples.
    let mut waypoints = vec![Waypoint::new(0, 0)];
    let mut t = 0u32;
    for chunk in data.chunks_exact(3) {
        if let [lo, hi, step] = chunk {
            t += u32::from(*step) + 1;
            waypoints.push(Waypoint::new(i32::from(i16::from_le_bytes([*lo, *hi])), t));
        }
    }

    for config in [CodecConfig::q16(), CodecConfig::legacy()] {
        let reference = ReferenceEncoder::new(&config).encode_commands(&waypoints);
        let streaming = StreamingEncoder::new(&config).encode_commands(&waypoints);
        assert_eq!(reference, streaming);

        let codec = Codec::new(config);
        if let Ok(stream) = codec.encode(&waypoints) {
            let samples = match codec.decode(&stream) {
                Ok(samples) => samples,
                Err(e) => panic!("encoded stream failed to decode: {e}"),
            };
            assert_eq!(samples.len() % config.batch_size() as usize, 0);
            assert!(samples.iter().all(|s| (-32768..=32767).contains(s)));
        }
    }
});
