// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-peer PASE attempt backoff tracker (§4.5.2, invariant §8.1.8).

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::config::PASE_BACKOFF_TIERS_MS;
use crate::error::{Error, Result};

struct Entry {
    consecutive_failures: u32,
    last_failure_at: Instant,
}

/// Tracks consecutive handshake failures per client identity (or source
/// address) and rejects new attempts with `Busy` until the tier for the
/// current failure count has elapsed.
pub struct AttemptTracker {
    entries: Mutex<HashMap<String, Entry>>,
}

impl Default for AttemptTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl AttemptTracker {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn tier_for(consecutive_failures: u32) -> Duration {
        if consecutive_failures == 0 {
            return Duration::ZERO;
        }
        let idx = (consecutive_failures as usize - 1).min(PASE_BACKOFF_TIERS_MS.len() - 1);
        Duration::from_millis(PASE_BACKOFF_TIERS_MS[idx])
    }

    /// Call before admitting a new handshake attempt from `peer`. Returns
    /// `Err(Error::Busy { retry_after_ms })` if the backoff tier for this
    /// peer's failure streak has not yet elapsed.
    pub fn check(&self, peer: &str) -> Result<()> {
        let entries = self.entries.lock();
        let Some(entry) = entries.get(peer) else {
            return Ok(());
        };
        let tier = Self::tier_for(entry.consecutive_failures);
        let elapsed = entry.last_failure_at.elapsed();
        if elapsed < tier {
            return Err(Error::Busy {
                retry_after_ms: (tier - elapsed).as_millis() as u64,
            });
        }
        Ok(())
    }

    /// Record a failed attempt, advancing the peer's failure streak.
    pub fn record_failure(&self, peer: &str) {
        let mut entries = self.entries.lock();
        let entry = entries.entry(peer.to_string()).or_insert(Entry {
            consecutive_failures: 0,
            last_failure_at: Instant::now(),
        });
        entry.consecutive_failures += 1;
        entry.last_failure_at = Instant::now();
    }

    /// Clear a peer's failure streak after a successful handshake.
    pub fn record_success(&self, peer: &str) {
        self.entries.lock().remove(peer);
    }

    /// The `retryAfterMs` that would currently be reported for `peer`, if
    /// any (used by tests and by the commissioning engine to echo the
    /// value in a `Busy` error).
    pub fn retry_after_ms(&self, peer: &str) -> Option<u64> {
        let entries = self.entries.lock();
        let entry = entries.get(peer)?;
        let tier = Self::tier_for(entry.consecutive_failures);
        let elapsed = entry.last_failure_at.elapsed();
        if elapsed < tier {
            Some((tier - elapsed).as_millis() as u64)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_attempt_is_never_busy() {
        let tracker = AttemptTracker::new();
        assert!(tracker.check("peer-a").is_ok());
    }

    #[test]
    fn first_failure_tier_is_zero_so_immediate_retry_allowed() {
        let tracker = AttemptTracker::new();
        tracker.record_failure("peer-a");
        assert!(tracker.check("peer-a").is_ok());
    }

    #[test]
    fn second_failure_enforces_backoff() {
        let tracker = AttemptTracker::new();
        tracker.record_failure("peer-a");
        tracker.record_failure("peer-a");
        let err = tracker.check("peer-a").unwrap_err();
        assert!(matches!(err, Error::Busy { retry_after_ms } if retry_after_ms > 0));
    }

    #[test]
    fn retry_after_ms_is_monotonic_across_failures() {
        let tracker = AttemptTracker::new();
        let mut last = 0u64;
        for _ in 0..5 {
            tracker.record_failure("peer-a");
            let retry = tracker.retry_after_ms("peer-a").unwrap_or(0);
            assert!(retry >= last);
            last = retry;
        }
    }

    #[test]
    fn success_clears_the_streak() {
        let tracker = AttemptTracker::new();
        tracker.record_failure("peer-a");
        tracker.record_failure("peer-a");
        tracker.record_success("peer-a");
        assert!(tracker.check("peer-a").is_ok());
    }

    #[test]
    fn peers_are_tracked_independently() {
        let tracker = AttemptTracker::new();
        tracker.record_failure("peer-a");
        tracker.record_failure("peer-a");
        assert!(tracker.check("peer-b").is_ok());
    }
}
