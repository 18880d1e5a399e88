// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pre-operational connection hardening (§4.5.2): connection cap, cooldown
//! per source address, and the stale-connection reaper.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::config::{CONNECTION_COOLDOWN, MAX_PRE_OPERATIONAL_CONNECTIONS, STALE_CONNECTION_TIMEOUT};
use crate::error::{Error, Result};

struct State {
    open: usize,
    last_closed_at: HashMap<String, Instant>,
    opened_at: HashMap<u64, Instant>,
    next_handle: u64,
}

/// Tracks pre-operational (commissioning) connections: enforces the
/// `maxZones + 1` cap, the 500 ms cooldown after a same-address close, and
/// identifies connections open ≥90 s without reaching the operational
/// state.
pub struct ConnectionGovernor {
    state: Mutex<State>,
}

impl Default for ConnectionGovernor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionGovernor {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                open: 0,
                last_closed_at: HashMap::new(),
                opened_at: HashMap::new(),
                next_handle: 1,
            }),
        }
    }

    /// Admit a new pre-operational connection from `addr`. Rejects with
    /// `Busy` if the connection cap is reached or the cooldown for `addr`
    /// has not elapsed; otherwise returns a handle identifying the slot.
    pub fn admit(&self, addr: &str) -> Result<u64> {
        let mut state = self.state.lock();
        if let Some(closed_at) = state.last_closed_at.get(addr) {
            let elapsed = closed_at.elapsed();
            if elapsed < CONNECTION_COOLDOWN {
                return Err(Error::Busy {
                    retry_after_ms: (CONNECTION_COOLDOWN - elapsed).as_millis() as u64,
                });
            }
        }
        if state.open >= MAX_PRE_OPERATIONAL_CONNECTIONS {
            return Err(Error::Busy { retry_after_ms: 0 });
        }
        let handle = state.next_handle;
        state.next_handle += 1;
        state.open += 1;
        state.opened_at.insert(handle, Instant::now());
        Ok(handle)
    }

    /// Release a connection slot, recording the close time for `addr`'s
    /// cooldown.
    pub fn release(&self, handle: u64, addr: &str) {
        let mut state = self.state.lock();
        if state.opened_at.remove(&handle).is_some() {
            state.open = state.open.saturating_sub(1);
        }
        state.last_closed_at.insert(addr.to_string(), Instant::now());
    }

    /// Handles of connections open at least [`STALE_CONNECTION_TIMEOUT`]
    /// without reaching the operational state. The caller closes each one
    /// and then calls [`Self::release`].
    pub fn stale_handles(&self) -> Vec<u64> {
        let state = self.state.lock();
        state
            .opened_at
            .iter()
            .filter(|(_, opened)| opened.elapsed() >= STALE_CONNECTION_TIMEOUT)
            .map(|(h, _)| *h)
            .collect()
    }

    pub fn open_count(&self) -> usize {
        self.state.lock().open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_up_to_the_cap() {
        let gov = ConnectionGovernor::new();
        for i in 0..MAX_PRE_OPERATIONAL_CONNECTIONS {
            assert!(gov.admit(&format!("10.0.0.{i}")).is_ok());
        }
        assert!(matches!(
            gov.admit("10.0.0.99"),
            Err(Error::Busy { .. })
        ));
    }

    #[test]
    fn release_frees_a_slot() {
        let gov = ConnectionGovernor::new();
        let h = gov.admit("10.0.0.1").unwrap();
        gov.release(h, "10.0.0.1");
        assert_eq!(gov.open_count(), 0);
    }

    #[test]
    fn cooldown_blocks_immediate_reconnect_from_same_address() {
        let gov = ConnectionGovernor::new();
        let h = gov.admit("10.0.0.1").unwrap();
        gov.release(h, "10.0.0.1");
        assert!(matches!(gov.admit("10.0.0.1"), Err(Error::Busy { .. })));
    }

    #[test]
    fn different_addresses_do_not_share_cooldown() {
        let gov = ConnectionGovernor::new();
        let h = gov.admit("10.0.0.1").unwrap();
        gov.release(h, "10.0.0.1");
        assert!(gov.admit("10.0.0.2").is_ok());
    }

    #[test]
    fn freshly_admitted_connection_is_not_stale() {
        let gov = ConnectionGovernor::new();
        gov.admit("10.0.0.1").unwrap();
        assert!(gov.stale_handles().is_empty());
    }
}
