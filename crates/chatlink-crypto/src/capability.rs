//! Injected signing capabilities.
//!
//! The chain never names a signature algorithm. A local identity supplies a
//! [`MessageSigner`]; every known remote public key supplies a
//! [`SignatureValidator`]. Both work over the canonical signable bytes of a
//! message.

use std::sync::Arc;

use crate::signature::MessageSignature;

/// Produces signatures for a local identity.
pub trait MessageSigner {
    /// Sign the given bytes.
    fn sign(&self, data: &[u8]) -> MessageSignature;
}

/// Checks signatures made by one remote key.
pub trait SignatureValidator {
    /// Return `true` if `signature` is authentic for `data`.
    fn validate(&self, data: &[u8], signature: &MessageSignature) -> bool;
}

impl<T: MessageSigner + ?Sized> MessageSigner for &T {
    fn sign(&self, data: &[u8]) -> MessageSignature {
        (**self).sign(data)
    }
}

impl<T: MessageSigner + ?Sized> MessageSigner for Arc<T> {
    fn sign(&self, data: &[u8]) -> MessageSignature {
        (**self).sign(data)
    }
}

impl<T: SignatureValidator + ?Sized> SignatureValidator for &T {
    fn validate(&self, data: &[u8], signature: &MessageSignature) -> bool {
        (**self).validate(data, signature)
    }
}

impl<T: SignatureValidator + ?Sized> SignatureValidator for Arc<T> {
    fn validate(&self, data: &[u8], signature: &MessageSignature) -> bool {
        (**self).validate(data, signature)
    }
}

/// Validator that accepts every signature.
///
/// Only for locally trusted sources, never for a remote sender.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAll;

impl SignatureValidator for AcceptAll {
    fn validate(&self, _data: &[u8], _signature: &MessageSignature) -> bool {
        true
    }
}

/// Validator that rejects every signature.
#[derive(Clone, Copy, Debug, Default)]
pub struct RejectAll;

impl SignatureValidator for RejectAll {
    fn validate(&self, _data: &[u8], _signature: &MessageSignature) -> bool {
        false
    }
}
