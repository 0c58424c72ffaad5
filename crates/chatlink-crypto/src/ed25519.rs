//! Ed25519 reference implementation of the signing capabilities.
//!
//! An Ed25519 signature is 64 bytes. It occupies the front of the
//! [`SIGNATURE_BYTES`]-long tag and the remainder is zero fill. Validation
//! rejects any tag whose fill is not all zeros, so a tag has exactly one
//! valid encoding.

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use crate::capability::{MessageSigner, SignatureValidator};
use crate::error::{CryptoError, Result};
use crate::signature::{MessageSignature, SIGNATURE_BYTES};

/// Size of an Ed25519 public key in bytes.
pub const PUBLIC_KEY_BYTES: usize = 32;

/// Size of a raw Ed25519 signature in bytes.
pub const ED25519_SIGNATURE_BYTES: usize = 64;

/// Ed25519 signing key for a local identity.
pub struct Ed25519KeyPair {
    signing: SigningKey,
}

impl Ed25519KeyPair {
    /// Generate a new random key pair.
    pub fn generate() -> Self {
        Self {
            signing: SigningKey::generate(&mut OsRng),
        }
    }

    /// Restore a key pair from its 32-byte secret seed.
    ///
    /// The caller's copy of the seed is wiped.
    pub fn from_seed(seed: &mut [u8; 32]) -> Self {
        let signing = SigningKey::from_bytes(seed);
        seed.zeroize();
        Self { signing }
    }

    /// Export the secret seed.
    pub fn secret_seed(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.signing.to_bytes())
    }

    /// Get the public half of this key pair.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey {
            key: self.signing.verifying_key(),
        }
    }
}

impl MessageSigner for Ed25519KeyPair {
    fn sign(&self, data: &[u8]) -> MessageSignature {
        let signature = self.signing.sign(data);
        let mut bytes = [0u8; SIGNATURE_BYTES];
        bytes[..ED25519_SIGNATURE_BYTES].copy_from_slice(&signature.to_bytes());
        MessageSignature::from_array(bytes)
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519KeyPair")
            .field("public", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// Ed25519 public key for a remote identity.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Ed25519PublicKey {
    key: VerifyingKey,
}

impl Ed25519PublicKey {
    /// Decode a public key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not `PUBLIC_KEY_BYTES` long or is
    /// not a valid curve point.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; PUBLIC_KEY_BYTES] =
            bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
                expected: PUBLIC_KEY_BYTES,
                actual: bytes.len(),
            })?;
        let key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
        Ok(Self { key })
    }

    /// Encode the public key.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_BYTES] {
        self.key.to_bytes()
    }
}

impl SignatureValidator for Ed25519PublicKey {
    fn validate(&self, data: &[u8], signature: &MessageSignature) -> bool {
        let (raw, fill) = signature.as_bytes().split_at(ED25519_SIGNATURE_BYTES);
        if fill.iter().any(|&b| b != 0) {
            return false;
        }
        let Ok(raw) = <[u8; ED25519_SIGNATURE_BYTES]>::try_from(raw) else {
            return false;
        };
        self.key
            .verify_strict(data, &Signature::from_bytes(&raw))
            .is_ok()
    }
}

impl TryFrom<Vec<u8>> for Ed25519PublicKey {
    type Error = CryptoError;

    fn try_from(bytes: Vec<u8>) -> Result<Self> {
        Self::from_bytes(&bytes)
    }
}

impl From<Ed25519PublicKey> for Vec<u8> {
    fn from(key: Ed25519PublicKey) -> Self {
        key.to_bytes().to_vec()
    }
}

impl PartialEq for Ed25519PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.key.as_bytes() == other.key.as_bytes()
    }
}

impl Eq for Ed25519PublicKey {}

impl std::hash::Hash for Ed25519PublicKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.as_bytes().hash(state);
    }
}

impl std::fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519PublicKey({})", hex::encode(&self.to_bytes()[..8]))
    }
}
