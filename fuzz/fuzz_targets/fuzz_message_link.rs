//! Fuzz target for MessageLink::from_bytes.
//!
//! Tests that parsing arbitrary bytes as a chain link is handled safely.

#![no_main]

use chatlink_protocol::MessageLink;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(link) = MessageLink::from_bytes(data) {
        let roundtrip = MessageLink::from_bytes(&link.to_bytes()).unwrap();
        assert_eq!(link, roundtrip);

        if let Some(next) = link.advance() {
            assert!(next.is_descendant_of(&link));
        }
    }
});
