//! Generation tokens for stale-result detection

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonically increasing counter identifying collection attempts.
///
/// At most one token is current at any time. Issuing a new generation does
/// not interrupt an in-flight collection; it only guarantees that the old
/// result is recognized as stale when it is delivered.
#[derive(Debug, Default)]
pub struct GenerationCounter {
    latest: AtomicU64,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new token and mark it current.
    pub fn next(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// The most recently issued token (0 if none was issued yet).
    pub fn current(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Check a delivered token against the current one.
    pub fn is_current(&self, token: u64) -> bool {
        self.current() == token
    }
}
