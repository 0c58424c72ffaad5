//! # chatlink-crypto
//!
//! Signature primitives for the chatlink signed message chain.
//!
//! This crate provides:
//! - **MessageSignature**: fixed-length authentication tag over a signable byte stream
//! - **MessageSigner** / **SignatureValidator**: the injected signing capabilities
//! - **Ed25519KeyPair** / **Ed25519PublicKey**: a reference implementation of both
//!
//! The protocol never depends on a particular algorithm. Anything that can
//! produce and check a [`MessageSignature`] over raw bytes can stand in for the
//! Ed25519 implementation.
//!
//! ## Security
//!
//! Secret seeds are wiped with `zeroize` after use and signature comparison
//! is constant-time via `subtle`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod capability;
pub mod ed25519;
pub mod error;
pub mod signature;

#[cfg(test)]
mod proptests;

pub use capability::{AcceptAll, MessageSigner, RejectAll, SignatureValidator};
pub use ed25519::{ED25519_SIGNATURE_BYTES, Ed25519KeyPair, Ed25519PublicKey, PUBLIC_KEY_BYTES};
pub use error::{CryptoError, Result};
pub use signature::{MessageSignature, SIGNATURE_BYTES};
