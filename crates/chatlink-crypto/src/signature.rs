//! The opaque signature tag carried by every signed chat message.
//!
//! A [`MessageSignature`] is exactly [`SIGNATURE_BYTES`] long. It is an
//! immutable value type: equality is byte-wise (and constant-time), and it
//! can be used as a hash-map key so caches can deduplicate signatures.

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::capability::SignatureValidator;
use crate::error::{CryptoError, Result};

/// Size of a message signature in bytes.
///
/// This is a wire-format constant: signatures are transmitted as exactly
/// this many raw bytes when they are not packed into a cache reference.
pub const SIGNATURE_BYTES: usize = 256;

/// A fixed-length authentication tag over a signable byte stream.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct MessageSignature {
    bytes: [u8; SIGNATURE_BYTES],
}

impl MessageSignature {
    /// Create a signature from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidSignatureLength` if the input is not
    /// exactly `SIGNATURE_BYTES` long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; SIGNATURE_BYTES] =
            bytes
                .try_into()
                .map_err(|_| CryptoError::InvalidSignatureLength {
                    expected: SIGNATURE_BYTES,
                    actual: bytes.len(),
                })?;
        Ok(Self { bytes })
    }

    /// Create a signature from an owned array.
    pub fn from_array(bytes: [u8; SIGNATURE_BYTES]) -> Self {
        Self { bytes }
    }

    /// Get the signature as a byte array.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_BYTES] {
        &self.bytes
    }

    /// Check this signature over `data` with the given validator.
    ///
    /// Has no side effects; the validator decides whether the tag is
    /// authentic for the bytes it was computed over.
    pub fn verify<V>(&self, data: &[u8], validator: &V) -> bool
    where
        V: SignatureValidator + ?Sized,
    {
        validator.validate(data, self)
    }
}

impl TryFrom<Vec<u8>> for MessageSignature {
    type Error = CryptoError;

    fn try_from(bytes: Vec<u8>) -> Result<Self> {
        Self::from_bytes(&bytes)
    }
}

impl From<MessageSignature> for Vec<u8> {
    fn from(signature: MessageSignature) -> Self {
        signature.bytes.to_vec()
    }
}

impl PartialEq for MessageSignature {
    fn eq(&self, other: &Self) -> bool {
        self.bytes.ct_eq(&other.bytes).into()
    }
}

impl Eq for MessageSignature {}

impl std::hash::Hash for MessageSignature {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        // Bucket selection only, not a security operation.
        self.bytes.hash(state);
    }
}

impl std::fmt::Debug for MessageSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Only show the first 8 bytes to avoid log pollution
        write!(f, "MessageSignature({}...)", hex::encode(&self.bytes[..8]))
    }
}
