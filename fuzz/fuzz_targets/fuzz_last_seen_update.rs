//! Fuzz target for LastSeenUpdate::from_bytes.
//!
//! Tests that arbitrary acknowledgments are decoded and validated safely.

#![no_main]

use chatlink_protocol::limits::LAST_SEEN_COUNT;
use chatlink_protocol::{LastSeenUpdate, LastSeenValidator, MessageSignature, SIGNATURE_BYTES};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&pending, rest)) = data.split_first() else {
        return;
    };
    let Ok(update) = LastSeenUpdate::from_bytes(rest) else {
        return;
    };

    if update.acknowledged.len() <= LAST_SEEN_COUNT {
        let bytes = update.to_bytes().unwrap();
        assert_eq!(LastSeenUpdate::from_bytes(&bytes).unwrap(), update);
    }

    let mut validator = LastSeenValidator::new(LAST_SEEN_COUNT);
    for n in 0..pending {
        let signature = MessageSignature::from_array([n; SIGNATURE_BYTES]);
        validator.add_pending(signature).unwrap();
    }

    if let Ok(seen) = validator.apply_update(&update) {
        assert_eq!(seen.len(), update.acknowledged.count_ones());
    }
});
