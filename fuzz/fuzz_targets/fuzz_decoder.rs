//! Fuzzes stream parsing and sample expansion.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_decoder
#![no_main]
use libfuzzer_sys::fuzz_target;
use pwl_codec::{CodecConfig, CommandStream, Decoder};

fuzz_target!(|data: &[u8]| {
    // Must never panic on arbitrary bytes, for either layout.
    for config in [CodecConfig::q16(), CodecConfig::legacy()] {
        if let Ok(stream) = CommandStream::from_bytes(*config.layout(), data) {
            let decoder = Decoder::new(&config);
            let commands = decoder.decode_commands(stream.words());
            // Cap the expansion so a handful of long sparse words stay cheap.
            if commands.iter().map(|c| u64::from(c.dt)).sum::<u64>() <= 1 << 20 {
                let _ = decoder.decode(&stream);
            }
        }
    }
});
