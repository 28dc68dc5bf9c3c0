// ── Runtime session configuration ──
//
// Tuning handed in by the consumer (CLI). Core never reads config files;
// the store clients themselves are built and injected by the caller.

use std::time::Duration;

/// Configuration for a [`SyncSession`](crate::session::SyncSession).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Interval between listener polls of each mirrored collection.
    pub poll_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
        }
    }
}
