//! Profile public keys and their issuance metadata.
//!
//! A profile key is an Ed25519 public key issued to one profile by a trusted
//! authority. The authority signs the tuple `(profile id, expiry, key)`; a
//! peer only builds a [`ProfilePublicKey`] after checking that signature.
//!
//! ## Signable Layout
//!
//! | Field | Size |
//! |---|---|
//! | profile id (big-endian UUID) | 16 |
//! | expires at (Unix millis, big-endian) | 8 |
//! | public key | 32 |

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chatlink_crypto::{Ed25519PublicKey, MessageSignature, MessageSigner, SignatureValidator};

use crate::error::{IdentityError, Result};
use crate::lifecycle::KeyState;
use crate::time::{duration_millis, now_millis};

/// Issuance metadata for a profile key, as transmitted between peers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileKeyData {
    /// Absolute expiry instant in Unix milliseconds.
    pub expires_at_millis: u64,
    /// The profile's public key.
    pub key: Ed25519PublicKey,
    /// Authority signature over the signable layout.
    pub key_signature: MessageSignature,
}

impl ProfileKeyData {
    /// Issue key data for a profile, signed by `authority`.
    pub fn issue<S>(
        authority: &S,
        profile_id: Uuid,
        expires_at_millis: u64,
        key: Ed25519PublicKey,
    ) -> Self
    where
        S: MessageSigner + ?Sized,
    {
        let signable = signable_bytes(profile_id, expires_at_millis, &key);
        Self {
            expires_at_millis,
            key,
            key_signature: authority.sign(&signable),
        }
    }

    /// Bytes the authority signs for this key and profile.
    pub fn signable_bytes(&self, profile_id: Uuid) -> Vec<u8> {
        signable_bytes(profile_id, self.expires_at_millis, &self.key)
    }

    /// Check the authority signature for the given profile.
    pub fn validate_signature<V>(&self, authority: &V, profile_id: Uuid) -> bool
    where
        V: SignatureValidator + ?Sized,
    {
        authority.validate(&self.signable_bytes(profile_id), &self.key_signature)
    }

    /// Check if the key has expired now.
    pub fn has_expired(&self) -> bool {
        self.has_expired_at(now_millis())
    }

    /// Check if the key had expired at `now_millis`.
    pub fn has_expired_at(&self, now_millis: u64) -> bool {
        self.expires_at_millis < now_millis
    }

    /// Check if the key has expired now, allowing a grace period past expiry.
    pub fn has_expired_with_grace(&self, grace: Duration) -> bool {
        self.has_expired_with_grace_at(grace, now_millis())
    }

    /// Check if the key had expired at `now_millis`, allowing a grace period.
    pub fn has_expired_with_grace_at(&self, grace: Duration, now_millis: u64) -> bool {
        self.expires_at_millis
            .saturating_add(duration_millis(grace))
            < now_millis
    }

    /// Classify the key at `now_millis`.
    pub fn state_at(&self, grace: Duration, now_millis: u64) -> KeyState {
        if !self.has_expired_at(now_millis) {
            KeyState::Active
        } else if !self.has_expired_with_grace_at(grace, now_millis) {
            KeyState::Grace
        } else {
            KeyState::Expired
        }
    }
}

fn signable_bytes(profile_id: Uuid, expires_at_millis: u64, key: &Ed25519PublicKey) -> Vec<u8> {
    let mut out = Vec::with_capacity(16 + 8 + 32);
    out.extend_from_slice(profile_id.as_bytes());
    out.extend_from_slice(&expires_at_millis.to_be_bytes());
    out.extend_from_slice(&key.to_bytes());
    out
}

/// A profile key whose issuance has been checked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfilePublicKey {
    data: ProfileKeyData,
}

impl ProfilePublicKey {
    /// Build a profile key after checking the authority signature.
    ///
    /// Expiry is not checked here; callers decide whether an expired key
    /// is acceptable in their context.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::InvalidKeySignature` if the authority
    /// signature does not validate for `profile_id`.
    pub fn create_validated<V>(authority: &V, profile_id: Uuid, data: ProfileKeyData) -> Result<Self>
    where
        V: SignatureValidator + ?Sized,
    {
        if !data.validate_signature(authority, profile_id) {
            return Err(IdentityError::InvalidKeySignature);
        }
        Ok(Self { data })
    }

    /// Wrap key data that is already trusted (for example, our own key).
    pub fn trusted(data: ProfileKeyData) -> Self {
        Self { data }
    }

    /// Get the issuance metadata.
    pub fn data(&self) -> &ProfileKeyData {
        &self.data
    }

    /// Get a validator for message signatures made with this key.
    pub fn signature_validator(&self) -> &Ed25519PublicKey {
        &self.data.key
    }
}
