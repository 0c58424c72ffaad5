//! Property-based tests for protocol components.
//!
//! These tests verify protocol invariants hold for arbitrary inputs:
//!
//! - Signatures bind link and body; any single-byte change fails validation
//! - Links advance by exactly one until the index space runs out
//! - Cached signatures always unpack to themselves
//! - Tracker updates are always accepted by the matching validator
//! - Wire decoders never panic on arbitrary input

use std::collections::VecDeque;

use proptest::prelude::*;
use uuid::Uuid;

use chatlink_crypto::{Ed25519KeyPair, MessageSignature, MessageSigner, SIGNATURE_BYTES};

use crate::bitset::BitSet;
use crate::body::{MessageBody, PackedBody};
use crate::cache::SignatureCache;
use crate::error::ChatError;
use crate::filter_mask::{FilterMask, FILTER_CHAR};
use crate::last_seen::{LastSeenMessages, LastSeenTracker, LastSeenUpdate, LastSeenValidator};
use crate::limits::{LAST_SEEN_COUNT, MAX_CONTENT_CHARS};
use crate::link::MessageLink;
use crate::session::RemoteChatSessionData;

fn numbered(n: u64) -> MessageSignature {
    let mut bytes = [0u8; SIGNATURE_BYTES];
    bytes[..8].copy_from_slice(&n.to_be_bytes());
    MessageSignature::from_array(bytes)
}

fn link_strategy() -> impl Strategy<Value = MessageLink> {
    (any::<u32>(), any::<u128>(), any::<u128>())
        .prop_map(|(index, sender, session)| {
            MessageLink::new(index, Uuid::from_u128(sender), Uuid::from_u128(session))
        })
}

fn body_strategy() -> impl Strategy<Value = MessageBody> {
    (".{0,64}", any::<u64>(), any::<i64>(), 0usize..=4).prop_map(|(content, ts, salt, seen)| {
        let last_seen = LastSeenMessages::new((0..seen as u64).map(numbered).collect())
            .unwrap_or_default();
        MessageBody::new(content, ts, salt, last_seen).unwrap_or_else(|_| MessageBody::unsigned(""))
    })
}

// ==================== Signing Property Tests ====================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// A signature over (link, body) validates, and flipping any byte of
    /// the signed stream makes it fail.
    #[test]
    fn signature_binds_every_byte(
        link in link_strategy(),
        body in body_strategy(),
        flip in any::<prop::sample::Index>(),
        mask in 1u8..=255,
    ) {
        let key = Ed25519KeyPair::generate();
        let public = key.public_key();
        let mut bytes = body.signable_bytes(&link);
        let signature = key.sign(&bytes);
        prop_assert!(signature.verify(&bytes, &public));

        let at = flip.index(bytes.len());
        bytes[at] ^= mask;
        prop_assert!(!signature.verify(&bytes, &public));
    }
}

// ==================== Link Property Tests ====================

proptest! {
    /// Advancing adds exactly one and keeps sender and session.
    #[test]
    fn advance_increments_by_one(link in link_strategy()) {
        match link.advance() {
            Some(next) => {
                prop_assert_eq!(next.index(), link.index() + 1);
                prop_assert!(next.is_descendant_of(&link));
                prop_assert!(!link.is_descendant_of(&next));
            }
            None => prop_assert_eq!(link.index(), u32::MAX),
        }
    }
}

// ==================== Cache Property Tests ====================

proptest! {
    /// Every cached signature packs to a slot that unpacks to itself, and
    /// no signature is held twice.
    #[test]
    fn cache_pack_unpack_roundtrip(
        pushes in prop::collection::vec(
            (prop::collection::vec(0u64..40, 0..=LAST_SEEN_COUNT), prop::option::of(0u64..40)),
            1..20,
        ),
        capacity in (LAST_SEEN_COUNT + 1)..64,
    ) {
        let mut cache = SignatureCache::new(capacity);
        for (seen, own) in &pushes {
            let mut unique = Vec::new();
            for n in seen {
                if !unique.contains(n) && own.as_ref() != Some(n) {
                    unique.push(*n);
                }
            }
            let seen = LastSeenMessages::new(unique.into_iter().map(numbered).collect()).unwrap();
            cache.push(&seen, own.map(numbered).as_ref());

            if let Some(own) = own {
                prop_assert_eq!(cache.pack(&numbered(*own)), Some(0));
            }
        }

        let mut held = Vec::new();
        for n in 0..40 {
            let sig = numbered(n);
            if let Some(id) = cache.pack(&sig) {
                prop_assert_eq!(cache.unpack(id), Some(&sig));
                held.push(id);
            }
        }
        held.sort_unstable();
        held.dedup();
        prop_assert_eq!(held.len(), cache.len());
    }
}

// ==================== Last-Seen Property Tests ====================

#[derive(Clone, Debug)]
enum Event {
    Send,
    Deliver,
    Reply,
}

fn event_strategy() -> impl Strategy<Value = Event> {
    prop_oneof![Just(Event::Send), Just(Event::Deliver), Just(Event::Reply)]
}

proptest! {
    /// With any interleaving of sends, delayed deliveries and replies, the
    /// validator accepts every update the tracker produces and reconstructs
    /// exactly the list the tracker signed.
    #[test]
    fn tracker_updates_always_validate(
        count in 1usize..=LAST_SEEN_COUNT,
        events in prop::collection::vec(event_strategy(), 0..200),
    ) {
        let mut validator = LastSeenValidator::new(count);
        let mut tracker = LastSeenTracker::new(count);
        let mut in_flight = VecDeque::new();
        let mut next = 0u64;

        for event in events {
            match event {
                Event::Send => {
                    let sig = numbered(next);
                    next += 1;
                    prop_assert!(validator.add_pending(sig.clone()).unwrap());
                    in_flight.push_back(sig);
                }
                Event::Deliver => {
                    if let Some(sig) = in_flight.pop_front() {
                        prop_assert!(tracker.add_pending(sig));
                    }
                }
                Event::Reply => {
                    let (seen, update) = tracker.generate_and_apply_update();
                    let reconstructed = validator.apply_update(&update).unwrap();
                    prop_assert_eq!(reconstructed, seen);
                }
            }
        }
    }

    /// After `n > count` pending entries, an offset of `n - count` leaves
    /// exactly `count`; any larger offset is refused.
    #[test]
    fn offset_trims_to_window(count in 1usize..=LAST_SEEN_COUNT, extra in 0usize..30) {
        let mut validator = LastSeenValidator::new(count);
        for n in 0..(count + extra) as u64 {
            validator.add_pending(numbered(n)).unwrap();
        }
        prop_assert!(!validator.apply_offset(extra as u32 + 1));
        prop_assert!(validator.apply_offset(extra as u32));
        prop_assert_eq!(validator.tracked_count(), count);
    }

    /// A bitset reaching past the window is always rejected.
    #[test]
    fn bits_outside_window_rejected(count in 1usize..LAST_SEEN_COUNT, beyond in 0usize..8) {
        let mut validator = LastSeenValidator::new(count);
        for n in 0..LAST_SEEN_COUNT as u64 {
            validator.add_pending(numbered(n)).unwrap();
        }
        let acknowledged: BitSet = [count + beyond].into_iter().collect();
        let result = validator.apply_update(&LastSeenUpdate::new(0, acknowledged));
        prop_assert!(matches!(result, Err(ChatError::AcknowledgmentInconsistent(_))));
    }
}

// ==================== Filter Mask Property Tests ====================

proptest! {
    /// Masking keeps the character count and replaces exactly the masked
    /// positions.
    #[test]
    fn filter_mask_replaces_masked_chars(
        text in ".{0,80}",
        masked in prop::collection::vec(0usize..80, 0..20),
    ) {
        let set: BitSet = masked.iter().copied().collect();
        let filtered = FilterMask::partial(set.clone()).apply(&text).unwrap();

        prop_assert_eq!(filtered.chars().count(), text.chars().count());
        for (i, (orig, out)) in text.chars().zip(filtered.chars()).enumerate() {
            if set.get(i) {
                prop_assert_eq!(out, FILTER_CHAR);
            } else {
                prop_assert_eq!(out, orig);
            }
        }
    }
}

// ==================== Wire Property Tests ====================

proptest! {
    /// Decoders return errors, never panic, on arbitrary bytes.
    #[test]
    fn decoders_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..600)) {
        let _ = MessageLink::from_bytes(&bytes);
        let _ = PackedBody::from_bytes(&bytes);
        let _ = LastSeenUpdate::from_bytes(&bytes);
        let _ = FilterMask::from_bytes(&bytes);
        let _ = RemoteChatSessionData::from_bytes(&bytes);
    }

    /// Body content over the character limit never encodes.
    #[test]
    fn oversized_content_rejected(extra in 1usize..16) {
        let content = "x".repeat(MAX_CONTENT_CHARS + extra);
        let packed = PackedBody::new(content, 0, 0, Default::default());
        prop_assert!(packed.to_bytes().is_err());
    }
}
