// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Commissioning-window state machine (§4.3): `Unregistered →
//! Unconnected → CommissioningOpen → Operational →
//! OperationalCommissioning`.

use std::time::{Duration, Instant};

use crate::config::{COMMISSIONING_WINDOW_DEFAULT, COMMISSIONING_WINDOW_MAX, PASE_FIRST_MESSAGE_TIMEOUT, PASE_HANDSHAKE_TIMEOUT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Unregistered,
    Unconnected,
    CommissioningOpen,
    Operational,
    OperationalCommissioning,
}

/// Tracks whether commissioning is currently accepted, the cumulative
/// open duration (capped at `COMMISSIONING_WINDOW_MAX`), and the grace
/// period extended to an in-progress PASE handshake after the window
/// closes (§4.3).
pub struct CommissioningWindow {
    state: WindowState,
    opened_at: Option<Instant>,
    closes_at: Option<Instant>,
    cumulative_open: Duration,
    has_operational_zone: bool,
}

impl Default for CommissioningWindow {
    fn default() -> Self {
        Self {
            state: WindowState::Unregistered,
            opened_at: None,
            closes_at: None,
            cumulative_open: Duration::ZERO,
            has_operational_zone: false,
        }
    }
}

impl CommissioningWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    /// Open (or re-trigger/extend) the commissioning window. Re-triggering
    /// extends the close deadline but the *cumulative* open time across
    /// re-triggers is capped at `COMMISSIONING_WINDOW_MAX` (§4.3).
    pub fn open(&mut self, now: Instant, requested: Duration) {
        let remaining_budget = COMMISSIONING_WINDOW_MAX.saturating_sub(self.cumulative_open);
        let grant = requested.min(remaining_budget);

        self.opened_at = Some(now);
        self.closes_at = Some(now + grant);
        self.cumulative_open += grant;

        self.state = if self.has_operational_zone {
            WindowState::OperationalCommissioning
        } else {
            WindowState::CommissioningOpen
        };
    }

    pub fn open_default(&mut self, now: Instant) {
        self.open(now, COMMISSIONING_WINDOW_DEFAULT);
    }

    /// Mark that a zone has been fully commissioned; used to pick between
    /// `CommissioningOpen` and `OperationalCommissioning` on the next
    /// `open()` and to settle into `Operational` once the window elapses.
    pub fn mark_operational(&mut self) {
        self.has_operational_zone = true;
    }

    /// Advance the state machine based on elapsed time. Call this from a
    /// timer tick.
    pub fn tick(&mut self, now: Instant) {
        let Some(closes_at) = self.closes_at else {
            return;
        };
        if now < closes_at {
            return;
        }

        self.closes_at = None;
        self.opened_at = None;
        self.state = if self.has_operational_zone {
            WindowState::Operational
        } else {
            WindowState::Unconnected
        };
    }

    /// Whether a *new* handshake may begin right now. Still `true` during
    /// the post-close grace period only for handshakes already admitted
    /// before the window closed — callers track that separately via the
    /// connection governor; this answers "is the window itself open".
    pub fn accepts_new_handshakes(&self, now: Instant) -> bool {
        matches!(self.state, WindowState::CommissioningOpen | WindowState::OperationalCommissioning)
            && self.closes_at.map(|t| now < t).unwrap_or(false)
    }

    /// Grace extended to an in-progress PASE handshake after the window
    /// closes, so a handshake admitted at the last possible instant can
    /// still finish (§4.3).
    pub fn handshake_grace() -> Duration {
        PASE_FIRST_MESSAGE_TIMEOUT + PASE_HANDSHAKE_TIMEOUT
    }
}
