// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Connection state machine (§4.1): `Disconnected → Connecting →
//! Connected → Closing → Disconnected`. Close is idempotent.

use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
    Closing = 3,
}

impl ConnectionState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => ConnectionState::Disconnected,
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            3 => ConnectionState::Closing,
            _ => unreachable!("ConnectionState only ever stores its own discriminants"),
        }
    }
}

/// A connection's lifecycle state, safe to read/transition from
/// multiple threads (the I/O loop thread transitions it; other threads
/// only read it to decide whether to send).
pub struct TransportConnection {
    state: AtomicU8,
}

impl Default for TransportConnection {
    fn default() -> Self {
        Self {
            state: AtomicU8::new(ConnectionState::Disconnected as u8),
        }
    }
}

impl TransportConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn begin_connecting(&self) {
        self.state.store(ConnectionState::Connecting as u8, Ordering::Release);
    }

    pub fn mark_connected(&self) {
        self.state.store(ConnectionState::Connected as u8, Ordering::Release);
    }

    /// Idempotent: calling this from multiple exit paths (timeout,
    /// error, explicit close) converges on `Disconnected` without
    /// panicking or double-running teardown. Returns `true` only for
    /// the call that actually performed the Closing→Disconnected
    /// transition, so callers can run teardown exactly once.
    pub fn close(&self) -> bool {
        loop {
            let current = self.state.load(Ordering::Acquire);
            match ConnectionState::from_u8(current) {
                ConnectionState::Disconnected => return false,
                ConnectionState::Closing => {
                    // Another thread is mid-teardown; converge without
                    // double-running it.
                    if self
                        .state
                        .compare_exchange(
                            current,
                            ConnectionState::Disconnected as u8,
                            Ordering::AcqRel,
                            Ordering::Acquire,
                        )
                        .is_ok()
                    {
                        return false;
                    }
                }
                _ => {
                    if self
                        .state
                        .compare_exchange(
                            current,
                            ConnectionState::Closing as u8,
                            Ordering::AcqRel,
                            Ordering::Acquire,
                        )
                        .is_ok()
                    {
                        self.state.store(ConnectionState::Disconnected as u8, Ordering::Release);
                        return true;
                    }
                }
            }
        }
    }

    pub fn is_operational(&self) -> bool {
        self.state() == ConnectionState::Connected
    }
}
