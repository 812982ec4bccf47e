//! Fuzz target for `AppConfig::parse`.
//!
//! Run with: cargo +nightly fuzz run fuzz_config_parser

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Parse errors are fine; panics are not.
        let _ = coursemind_config::AppConfig::parse(s);
    }
});
