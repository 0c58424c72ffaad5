//! Fuzz target for PackedBody::from_bytes.
//!
//! Tests that parsing arbitrary bytes as a packed body never panics, and
//! that unpacking against an empty cache only fails with a desync.

#![no_main]

use chatlink_protocol::limits::LAST_SEEN_COUNT;
use chatlink_protocol::{ChatError, PackedBody, PackedSignature, SignatureCache};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(packed) = PackedBody::from_bytes(data) else {
        return;
    };

    // Decoded content always fits the limit, so re-encoding succeeds
    let bytes = packed.to_bytes().unwrap();
    assert_eq!(PackedBody::from_bytes(&bytes).unwrap(), packed);

    let cache = SignatureCache::new(16);
    let all_full = packed
        .last_seen()
        .entries()
        .iter()
        .all(|entry| matches!(entry, PackedSignature::Full(_)));
    match packed.unpack(&cache, LAST_SEEN_COUNT) {
        Ok(body) => assert_eq!(body.content(), packed.content()),
        Err(ChatError::CacheDesync { .. }) => assert!(!all_full),
        Err(other) => panic!("unexpected unpack error: {other}"),
    }
});
