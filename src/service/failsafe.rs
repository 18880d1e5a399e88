// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-zone failsafe timer (§4.9, §4.10): starts counting down the
//! instant a zone disconnects, and is cancelled by a reconnect before it
//! elapses. Expiry is the device's signal to drive that zone's
//! [`crate::features::LimitResolver`] into `Failsafe` and emit
//! `Event::FailsafeTriggered`; a later reconnect clears it again via
//! `Event::FailsafeCleared`.

use std::time::{Duration, Instant};

use crate::config::FAILSAFE_DURATION;

pub struct FailsafeTimer {
    duration: Duration,
    disconnected_at: Option<Instant>,
    active: bool,
}

impl Default for FailsafeTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FailsafeTimer {
    pub fn new() -> Self {
        Self::with_duration(FAILSAFE_DURATION)
    }

    pub fn with_duration(duration: Duration) -> Self {
        Self {
            duration,
            disconnected_at: None,
            active: false,
        }
    }

    /// The zone's connection dropped; start (or leave running, if already
    /// running) the countdown.
    pub fn on_disconnect(&mut self, now: Instant) {
        if self.disconnected_at.is_none() {
            self.disconnected_at = Some(now);
        }
    }

    /// The zone reconnected. Returns `true` if failsafe had actually
    /// become active, so the caller knows to emit `FailsafeCleared`.
    pub fn on_connect(&mut self) -> bool {
        self.disconnected_at = None;
        let was_active = self.active;
        self.active = false;
        was_active
    }

    /// Advance the timer. Returns `true` the one time this call is the
    /// one that crosses the failsafe threshold.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.active {
            return false;
        }
        let Some(disconnected_at) = self.disconnected_at else {
            return false;
        };
        if now.duration_since(disconnected_at) >= self.duration {
            self.active = true;
            true
        } else {
            false
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_counting_down(&self) -> bool {
        self.disconnected_at.is_some() && !self.active
    }
}
