use std::collections::VecDeque;

use tracing::debug;

use chatlink_crypto::MessageSignature;

use crate::error::{AckViolation, ChatError, Result};
use crate::limits::{LAST_SEEN_COUNT, MAX_TRACKED_MESSAGES};

use super::{LastSeenMessages, LastSeenUpdate};

#[derive(Clone, Debug)]
struct TrackedEntry {
    signature: MessageSignature,
    pending: bool,
}

/// Checks a peer's acknowledgments against the messages sent to it.
///
/// Every message sent to the peer is recorded with [`add_pending`]. Each
/// update from the peer first drops `offset` entries from the front, then
/// the first `last_seen_count` entries form the window its bitset covers.
/// Entries past the highest acknowledged slot that are still pending are in
/// flight and left alone.
///
/// [`add_pending`]: LastSeenValidator::add_pending
#[derive(Clone, Debug)]
pub struct LastSeenValidator {
    last_seen_count: usize,
    tracked: VecDeque<Option<TrackedEntry>>,
    last_pending: Option<MessageSignature>,
}

impl LastSeenValidator {
    /// Create a validator with a window of `last_seen_count` slots, capped
    /// at `LAST_SEEN_COUNT`.
    pub fn new(last_seen_count: usize) -> Self {
        Self {
            last_seen_count: last_seen_count.min(LAST_SEEN_COUNT),
            tracked: VecDeque::new(),
            last_pending: None,
        }
    }

    /// Window size.
    pub fn last_seen_count(&self) -> usize {
        self.last_seen_count
    }

    /// Number of tracked entries, including cleared ones.
    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    /// Record a message sent to the peer.
    ///
    /// Returns `false` when `signature` repeats the previous call.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::TooManyPendingMessages` once the peer has left
    /// `MAX_TRACKED_MESSAGES` entries unacknowledged.
    pub fn add_pending(&mut self, signature: MessageSignature) -> Result<bool> {
        if self.last_pending.as_ref() == Some(&signature) {
            return Ok(false);
        }
        if self.tracked.len() >= MAX_TRACKED_MESSAGES {
            return Err(ChatError::TooManyPendingMessages {
                max: MAX_TRACKED_MESSAGES,
            });
        }
        self.tracked.push_back(Some(TrackedEntry {
            signature: signature.clone(),
            pending: true,
        }));
        self.last_pending = Some(signature);
        Ok(true)
    }

    /// Drop the first `offset` tracked entries.
    ///
    /// Returns `false` and changes nothing unless at least
    /// `last_seen_count` entries would remain.
    pub fn apply_offset(&mut self, offset: u32) -> bool {
        let offset = offset as usize;
        if offset > self.max_offset() {
            return false;
        }
        self.tracked.drain(..offset);
        true
    }

    /// Apply an acknowledgment from the peer.
    ///
    /// Returns the acknowledged signatures, oldest first: the last-seen list
    /// the peer's next body must carry.
    ///
    /// Pending entries past the highest acknowledged slot are still in
    /// flight to the peer, so a clear bit there is not a drop.
    ///
    /// # Errors
    ///
    /// - `WindowOffsetOutOfRange` if the offset would shrink the history
    ///   below the window.
    /// - `AcknowledgmentInconsistent` if the bitset reaches past the window,
    ///   acknowledges an empty slot, or skips a pending message that an
    ///   acknowledged one followed.
    pub fn apply_update(&mut self, update: &LastSeenUpdate) -> Result<LastSeenMessages> {
        let max = self.max_offset();
        if !self.apply_offset(update.offset) {
            debug!(offset = update.offset, max, "Rejected last-seen offset");
            return Err(ChatError::WindowOffsetOutOfRange {
                offset: update.offset,
                max,
            });
        }

        let acknowledged = &update.acknowledged;
        let highest = acknowledged.len();
        if highest > self.last_seen_count {
            return Err(self.reject(AckViolation::OutsideWindow {
                highest: highest - 1,
                window: self.last_seen_count,
            }));
        }

        for index in 0..self.last_seen_count {
            let entry = self.tracked.get(index).and_then(Option::as_ref);
            match (acknowledged.get(index), entry) {
                (true, None) => return Err(self.reject(AckViolation::UnknownEntry { index })),
                (false, Some(entry)) if entry.pending && index < highest => {
                    return Err(self.reject(AckViolation::DroppedPending { index }));
                }
                _ => {}
            }
        }

        let mut signatures = Vec::with_capacity(acknowledged.count_ones());
        for (index, slot) in self
            .tracked
            .iter_mut()
            .take(self.last_seen_count)
            .enumerate()
        {
            if acknowledged.get(index) {
                if let Some(entry) = slot {
                    entry.pending = false;
                    signatures.push(entry.signature.clone());
                }
            } else if slot.as_ref().is_some_and(|entry| !entry.pending) {
                *slot = None;
            }
        }

        LastSeenMessages::with_capacity(signatures, self.last_seen_count)
    }

    fn max_offset(&self) -> usize {
        self.tracked.len().saturating_sub(self.last_seen_count)
    }

    fn reject(&self, violation: AckViolation) -> ChatError {
        debug!(%violation, tracked = self.tracked.len(), "Rejected last-seen update");
        ChatError::AcknowledgmentInconsistent(violation)
    }
}
