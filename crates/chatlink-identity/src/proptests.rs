//! Property-based tests for profile key issuance.

use proptest::prelude::*;
use uuid::Uuid;

use chatlink_crypto::Ed25519KeyPair;

use crate::profile_key::{ProfileKeyData, ProfilePublicKey};

proptest! {
    /// Issued key data validates for the profile it was issued to.
    #[test]
    fn issued_key_validates(id in any::<u128>(), expires in any::<u64>()) {
        let authority = Ed25519KeyPair::generate();
        let profile_id = Uuid::from_u128(id);
        let data = ProfileKeyData::issue(&authority, profile_id, expires, Ed25519KeyPair::generate().public_key());

        prop_assert!(ProfilePublicKey::create_validated(&authority.public_key(), profile_id, data).is_ok());
    }

    /// Key data never validates for a different profile.
    #[test]
    fn issued_key_bound_to_profile(a in any::<u128>(), b in any::<u128>()) {
        prop_assume!(a != b);
        let authority = Ed25519KeyPair::generate();
        let data = ProfileKeyData::issue(&authority, Uuid::from_u128(a), 0, Ed25519KeyPair::generate().public_key());

        prop_assert!(!data.validate_signature(&authority.public_key(), Uuid::from_u128(b)));
    }

    /// Expiry is monotonic in time.
    #[test]
    fn expiry_is_monotonic(expires in 0u64..u64::MAX / 2, t1 in any::<u32>(), dt in any::<u32>()) {
        let authority = Ed25519KeyPair::generate();
        let data = ProfileKeyData::issue(&authority, Uuid::nil(), expires, authority.public_key());

        let early = expires + u64::from(t1);
        let late = early + u64::from(dt);
        if data.has_expired_at(early) {
            prop_assert!(data.has_expired_at(late));
        }
    }
}
