//! Per-key log suppression.
//!
//! An unmatched source can be noisy (a bot added to a busy group nobody
//! routes). [`LogThrottle::allow`] answers `true` at most once per key per
//! cooldown so the dispatcher logs each such source occasionally.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use dashmap::{DashMap, mapref::entry::Entry};

const CLEANUP_EVERY_CHECKS: u64 = 256;

#[derive(Debug, Clone)]
pub struct LogThrottle {
    cooldown: Duration,
    last_logged: Arc<DashMap<String, Instant>>,
    checks_seen: Arc<AtomicU64>,
}

impl LogThrottle {
    #[must_use]
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_logged: Arc::new(DashMap::new()),
            checks_seen: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Whether a line for `key` may be logged now. Records the attempt when
    /// it returns `true`.
    #[must_use]
    pub fn allow(&self, key: &str) -> bool {
        self.allow_at(key, Instant::now())
    }

    fn allow_at(&self, key: &str, now: Instant) -> bool {
        let allowed = match self.last_logged.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if now.duration_since(*occupied.get()) >= self.cooldown {
                    occupied.insert(now);
                    true
                } else {
                    false
                }
            },
            Entry::Vacant(vacant) => {
                vacant.insert(now);
                true
            },
        };
        self.cleanup_if_needed(now);
        allowed
    }

    fn cleanup_if_needed(&self, now: Instant) {
        let seen = self.checks_seen.fetch_add(1, Ordering::Relaxed) + 1;
        if !seen.is_multiple_of(CLEANUP_EVERY_CHECKS) {
            return;
        }
        let cooldown = self.cooldown;
        self.last_logged
            .retain(|_, logged_at| now.duration_since(*logged_at) < cooldown);
    }

    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.last_logged.len()
    }
}

impl Default for LogThrottle {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}
