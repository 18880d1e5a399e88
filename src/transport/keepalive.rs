// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ping/pong keep-alive tracking (§4.1).

use std::time::{Duration, Instant};

use crate::config::{KEEPALIVE_MAX_MISSED_PONGS, KEEPALIVE_PING_INTERVAL, KEEPALIVE_PONG_TIMEOUT};

/// Tracks ping/pong liveness for one connection. The I/O loop calls
/// [`Self::tick`] periodically; when it returns `Action::SendPing`, the
/// caller writes a `Ping` control frame. [`Self::missed_pongs`] reaching
/// `KEEPALIVE_MAX_MISSED_PONGS` means the connection is dead and should
/// be force-closed (§4.1).
pub struct KeepAlive {
    ping_interval: Duration,
    pong_timeout: Duration,
    last_ping_sent: Option<Instant>,
    awaiting_pong: bool,
    missed_pongs: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    SendPing,
    ConnectionDead,
}

impl Default for KeepAlive {
    fn default() -> Self {
        Self {
            ping_interval: KEEPALIVE_PING_INTERVAL,
            pong_timeout: KEEPALIVE_PONG_TIMEOUT,
            last_ping_sent: None,
            awaiting_pong: false,
            missed_pongs: 0,
        }
    }
}

impl KeepAlive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_intervals(ping_interval: Duration, pong_timeout: Duration) -> Self {
        Self {
            ping_interval,
            pong_timeout,
            ..Self::default()
        }
    }

    pub fn on_pong(&mut self) {
        self.awaiting_pong = false;
        self.missed_pongs = 0;
    }

    /// Any inbound traffic resets the schedule — a connection actively
    /// exchanging requests doesn't need a ping to prove liveness.
    pub fn on_activity(&mut self, now: Instant) {
        self.last_ping_sent = Some(now);
        self.awaiting_pong = false;
    }

    pub fn tick(&mut self, now: Instant) -> Action {
        if self.awaiting_pong {
            let sent_at = self.last_ping_sent.expect("awaiting_pong implies a ping was sent");
            if now.duration_since(sent_at) >= self.pong_timeout {
                self.missed_pongs += 1;
                self.awaiting_pong = false;
                if self.missed_pongs >= KEEPALIVE_MAX_MISSED_PONGS {
                    return Action::ConnectionDead;
                }
            } else {
                return Action::None;
            }
        }

        let due = self
            .last_ping_sent
            .map(|sent_at| now.duration_since(sent_at) >= self.ping_interval)
            .unwrap_or(true);

        if due {
            self.last_ping_sent = Some(now);
            self.awaiting_pong = true;
            Action::SendPing
        } else {
            Action::None
        }
    }
}
