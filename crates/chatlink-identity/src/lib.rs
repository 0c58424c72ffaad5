//! # chatlink-identity
//!
//! Profile keys for the chatlink protocol.
//!
//! Provides:
//! - Profile public keys with issuance metadata (`ProfileKeyData`)
//! - Authority validation of issued key data (`ProfilePublicKey::create_validated`)
//! - Expiry predicates with and without a refresh grace period
//! - Local profile key pairs used to sign chat messages

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod key_pair;
pub mod lifecycle;
pub mod profile_key;
pub mod time;

#[cfg(test)]
mod proptests;

pub use error::{IdentityError, Result};
pub use key_pair::ProfileKeyPair;
pub use lifecycle::{KEY_REFRESH_GRACE, KEY_REFRESH_LEAD, KEY_VALIDITY, KeyState};
pub use profile_key::{ProfileKeyData, ProfilePublicKey};
