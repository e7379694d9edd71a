//! Fuzz target for the value classifier.
//!
//! The classifier is total: any UTF-8 input yields a type, never a panic,
//! and whitespace around a value never changes its type.

#![no_main]

use libfuzzer_sys::fuzz_target;
use rodeo::classify;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let ty = classify(s);
        assert_eq!(ty, classify(&format!(" {} ", s)));
    }
});
