//! Wall-clock helpers.
//!
//! All protocol instants are Unix epoch milliseconds in a `u64`.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Get the current Unix time in milliseconds.
///
/// A system clock set before the Unix epoch reads as the epoch itself.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(duration_millis)
        .unwrap_or(0)
}

/// Convert a duration to whole milliseconds, saturating at `u64::MAX`.
pub fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
