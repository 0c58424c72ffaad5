//! Per-sender message chains.
//!
//! A sender's [`ChainEncoder`] binds each outgoing body to the next link and
//! signs it. The receiver holds one [`ChainDecoder`] per sender, expecting
//! exactly the link the encoder used; any gap, replay, timestamp regression
//! or bad signature breaks the chain for good.

mod decoder;
mod encoder;

pub use decoder::{ChainDecoder, MessageDecoder, UnsignedDecoder};
pub use encoder::ChainEncoder;
