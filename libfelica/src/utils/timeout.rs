// libfelica/src/utils/timeout.rs

use std::time::Duration;

/// Per-exchange timeout used when a caller sets none. FeliCa commands
/// answer within a few milliseconds; the margin covers slow links.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 1000;

/// Shorthand for [`Duration::from_millis`].
pub fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

/// [`DEFAULT_READ_TIMEOUT_MS`] as a `Duration`.
pub fn default_read_timeout() -> Duration {
    ms(DEFAULT_READ_TIMEOUT_MS)
}
