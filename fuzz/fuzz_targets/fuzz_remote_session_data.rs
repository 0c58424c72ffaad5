//! Fuzz target for RemoteChatSessionData::from_bytes.
//!
//! Tests that parsing arbitrary session announcements is handled safely.

#![no_main]

use chatlink_protocol::RemoteChatSessionData;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(session) = RemoteChatSessionData::from_bytes(data) {
        let roundtrip = RemoteChatSessionData::from_bytes(&session.to_bytes()).unwrap();
        assert_eq!(session, roundtrip);
    }
});
