use std::collections::VecDeque;

use chatlink_crypto::MessageSignature;

use crate::bitset::BitSet;
use crate::limits::LAST_SEEN_COUNT;

use super::{LastSeenMessages, LastSeenUpdate};

/// Records the messages a participant has seen, for its next signed body.
///
/// Holds the newest `last_seen_count` signatures received, oldest first,
/// and counts how many slid out of the window since the last update.
#[derive(Clone, Debug)]
pub struct LastSeenTracker {
    last_seen_count: usize,
    window: VecDeque<MessageSignature>,
    offset: u32,
    last_tracked: Option<MessageSignature>,
}

impl LastSeenTracker {
    /// Create a tracker with a window of `last_seen_count` slots, capped at
    /// `LAST_SEEN_COUNT`.
    pub fn new(last_seen_count: usize) -> Self {
        let last_seen_count = last_seen_count.min(LAST_SEEN_COUNT);
        Self {
            last_seen_count,
            window: VecDeque::with_capacity(last_seen_count + 1),
            offset: 0,
            last_tracked: None,
        }
    }

    /// Window size.
    pub fn last_seen_count(&self) -> usize {
        self.last_seen_count
    }

    /// Messages dropped from the window since the last update.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Record a received message.
    ///
    /// Returns `false` when `signature` repeats the previous call.
    pub fn add_pending(&mut self, signature: MessageSignature) -> bool {
        if self.last_tracked.as_ref() == Some(&signature) {
            return false;
        }
        self.window.push_back(signature.clone());
        if self.window.len() > self.last_seen_count {
            self.window.pop_front();
            self.offset = self.offset.saturating_add(1);
        }
        self.last_tracked = Some(signature);
        true
    }

    /// Build the update for the next outgoing message and reset the offset.
    ///
    /// Every slot in the window is acknowledged; the returned list is what
    /// the outgoing body carries and signs.
    pub fn generate_and_apply_update(&mut self) -> (LastSeenMessages, LastSeenUpdate) {
        let acknowledged: BitSet = (0..self.window.len()).collect();
        let update = LastSeenUpdate::new(self.offset, acknowledged);
        self.offset = 0;

        let seen = LastSeenMessages {
            entries: self.window.iter().cloned().collect(),
        };
        (seen, update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatlink_crypto::SIGNATURE_BYTES;

    fn sig(tag: u8) -> MessageSignature {
        MessageSignature::from_array([tag; SIGNATURE_BYTES])
    }

    #[test]
    fn test_empty_update() {
        let mut tracker = LastSeenTracker::new(3);
        let (seen, update) = tracker.generate_and_apply_update();
        assert!(seen.is_empty());
        assert_eq!(update, LastSeenUpdate::default());
    }

    #[test]
    fn test_window_slides() {
        let mut tracker = LastSeenTracker::new(3);
        for tag in 1..=5 {
            assert!(tracker.add_pending(sig(tag)));
        }
        assert_eq!(tracker.offset(), 2);

        let (seen, update) = tracker.generate_and_apply_update();
        assert_eq!(seen.entries(), &[sig(3), sig(4), sig(5)]);
        assert_eq!(update.offset, 2);
        assert_eq!(update.acknowledged.len(), 3);
        assert_eq!(update.acknowledged.count_ones(), 3);
        assert_eq!(tracker.offset(), 0);
    }

    #[test]
    fn test_repeat_ignored() {
        let mut tracker = LastSeenTracker::new(3);
        assert!(tracker.add_pending(sig(1)));
        assert!(!tracker.add_pending(sig(1)));

        let (seen, _) = tracker.generate_and_apply_update();
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn test_repeated_updates_keep_window() {
        let mut tracker = LastSeenTracker::new(2);
        tracker.add_pending(sig(1));
        let (first, _) = tracker.generate_and_apply_update();
        let (second, update) = tracker.generate_and_apply_update();
        assert_eq!(first, second);
        assert_eq!(update.offset, 0);
    }
}
