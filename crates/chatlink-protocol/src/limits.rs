//! Protocol limits and constants.
//!
//! All protocol limits are defined here for consistent enforcement.

use std::time::Duration;

pub use chatlink_crypto::SIGNATURE_BYTES;

// === Signing ===

/// Version tag at the front of every signable byte stream.
pub const SIGNABLE_VERSION: i32 = 1;

/// Largest link index; advancing past it exhausts the chain.
pub const MAX_LINK_INDEX: u32 = u32::MAX;

// === Messages ===

/// Maximum characters of message content.
pub const MAX_CONTENT_CHARS: usize = 256;

/// Messages older than this are flagged by a server (5 minutes).
pub const MESSAGE_EXPIRY_SERVER: Duration = Duration::from_secs(5 * 60);

/// Messages older than this are flagged by a client (7 minutes).
pub const MESSAGE_EXPIRY_CLIENT: Duration = Duration::from_secs(7 * 60);

// === Acknowledgment ===

/// Maximum last-seen signatures carried by a body, and the default window.
pub const LAST_SEEN_COUNT: usize = 20;

/// Most sent messages a validator tracks before the peer must acknowledge.
pub const MAX_TRACKED_MESSAGES: usize = 4096;

/// Default number of slots in a signature cache.
pub const SIGNATURE_CACHE_CAPACITY: usize = 128;

// === Wire ===

/// Maximum bytes of a public key on the wire.
pub const MAX_PUBLIC_KEY_WIRE_BYTES: usize = 512;

/// Maximum 64-bit words in a partial filter mask on the wire.
pub const MAX_FILTER_MASK_WORDS: usize = MAX_CONTENT_CHARS.div_ceil(64);
