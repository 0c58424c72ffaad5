//! # chatlink-protocol
//!
//! The signed chat message chain.
//!
//! This crate provides:
//! - **MessageLink**: a position in one sender's signing chain
//! - **MessageBody**: the signed payload and its canonical signable bytes
//! - **ChainEncoder** / **ChainDecoder**: per-sender signing and verification
//! - **SignatureCache**: compresses repeated signatures into slot references
//! - **LastSeenTracker** / **LastSeenValidator**: sliding-window acknowledgment
//! - **FilterMask**: display redaction that leaves signed content intact
//! - **LocalChatSession** / **RemoteChatSession**: session setup around a profile key
//!
//! ## Chain rules
//!
//! A decoder accepts messages only at the exact next link and with
//! non-decreasing timestamps. Any violation, or a bad signature, breaks the
//! chain for that sender permanently; nothing is buffered or reordered.
//!
//! ## Per-connection state
//!
//! Nothing here is global. Each connection owns its encoder, decoders,
//! caches and last-seen state, all sized by a [`ChatConfig`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bitset;
pub mod body;
pub mod cache;
pub mod chain;
pub mod config;
pub mod error;
pub mod filter_mask;
pub mod last_seen;
pub mod limits;
pub mod link;
pub mod message;
pub mod session;
pub mod wire;

#[cfg(test)]
mod proptests;

pub use bitset::BitSet;
pub use body::{random_salt, MessageBody, PackedBody};
pub use cache::{PackedSignature, SignatureCache};
pub use chain::{ChainDecoder, ChainEncoder, MessageDecoder, UnsignedDecoder};
pub use config::{ChatConfig, ChatConfigBuilder, ConfigError};
pub use error::{AckViolation, ChatError, Result};
pub use filter_mask::{FilterMask, FILTER_CHAR};
pub use last_seen::{
    LastSeenMessages, LastSeenTracker, LastSeenUpdate, LastSeenValidator, PackedLastSeen,
};
pub use link::MessageLink;
pub use message::ChatMessage;
pub use session::{LocalChatSession, RemoteChatSession, RemoteChatSessionData};

pub use chatlink_crypto::{MessageSignature, MessageSigner, SignatureValidator, SIGNATURE_BYTES};
