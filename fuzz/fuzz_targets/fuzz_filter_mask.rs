//! Fuzz target for FilterMask::from_bytes.
//!
//! Tests that parsing arbitrary masks is handled safely and that applying
//! one never changes the character count.

#![no_main]

use chatlink_protocol::FilterMask;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(mask) = FilterMask::from_bytes(data) else {
        return;
    };

    let bytes = mask.to_bytes().unwrap();
    assert_eq!(FilterMask::from_bytes(&bytes).unwrap(), mask);

    let text = "the quick brown fox jumps over the lazy dog";
    if let Some(filtered) = mask.apply(text) {
        assert_eq!(filtered.chars().count(), text.chars().count());
    } else {
        assert!(mask.is_fully_filtered());
    }
});
