//! Property-based tests for the signing capabilities.
//!
//! - Signatures made by a key pair always validate under its public key
//! - Flipping any single byte of the signed data breaks validation
//! - Flipping any single byte of the tag breaks validation

use proptest::prelude::*;

use crate::{Ed25519KeyPair, MessageSignature, MessageSigner, SIGNATURE_BYTES, SignatureValidator};

proptest! {
    #[test]
    fn sign_then_validate_succeeds(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let pair = Ed25519KeyPair::generate();
        let sig = pair.sign(&data);
        prop_assert!(pair.public_key().validate(&data, &sig));
    }

    #[test]
    fn tampered_data_fails(
        data in prop::collection::vec(any::<u8>(), 1..512),
        index in any::<prop::sample::Index>(),
        flip in 1u8..=255,
    ) {
        let pair = Ed25519KeyPair::generate();
        let sig = pair.sign(&data);

        let mut tampered = data.clone();
        let i = index.index(tampered.len());
        tampered[i] ^= flip;

        prop_assert!(!pair.public_key().validate(&tampered, &sig));
    }

    #[test]
    fn tampered_tag_fails(
        data in prop::collection::vec(any::<u8>(), 0..128),
        index in 0usize..SIGNATURE_BYTES,
        flip in 1u8..=255,
    ) {
        let pair = Ed25519KeyPair::generate();
        let mut bytes = *pair.sign(&data).as_bytes();
        bytes[index] ^= flip;

        let tampered = MessageSignature::from_array(bytes);
        prop_assert!(!pair.public_key().validate(&data, &tampered));
    }
}
