// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Subscription registry: allocation, priming, and per-subscription window
//! bookkeeping (§4.7, §4.8 "Subscribe"/"Unsubscribe").

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use ciborium::value::Value;

use crate::error::{Error, Result};
use crate::subscription::{CoalescingWindow, Subscription, ValueSnapshot};

/// Emitted by the manager when a window closes or a heartbeat is due;
/// the owning session turns this into a wire `Notification` (§3.1).
#[derive(Debug, Clone)]
pub struct SubscriptionEvent {
    pub subscription_id: u32,
    pub endpoint_id: u8,
    pub feature_id: u8,
    pub values: ValueSnapshot,
}

struct Entry {
    subscription: Subscription,
    window: CoalescingWindow,
}

/// Owns the live subscriptions for one connection. Subscriptions do not
/// survive connection loss (§4.7), so this is constructed fresh per
/// session and dropped with it.
pub struct SubscriptionManager {
    next_id: AtomicU32,
    entries: HashMap<u32, Entry>,
}

impl Default for SubscriptionManager {
    fn default() -> Self {
        Self {
            next_id: AtomicU32::new(1),
            entries: HashMap::new(),
        }
    }
}

impl SubscriptionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscription and return its id plus a priming
    /// snapshot request: the caller reads current values for
    /// `attr_ids` and sends them as the first notification (§4.7
    /// "Priming").
    pub fn subscribe(
        &mut self,
        zone_id: impl Into<String>,
        endpoint_id: u8,
        feature_id: u8,
        attr_ids: Vec<u16>,
        min_interval: Duration,
        max_interval: Duration,
        suppress_bounce_back: bool,
    ) -> u32 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let subscription = Subscription {
            id,
            zone_id: zone_id.into(),
            endpoint_id,
            feature_id,
            attr_ids,
            min_interval,
            max_interval,
            suppress_bounce_back,
        };
        let window = CoalescingWindow::new(min_interval, max_interval, suppress_bounce_back);
        self.entries.insert(id, Entry { subscription, window });
        id
    }

    pub fn unsubscribe(&mut self, subscription_id: u32) -> Result<()> {
        self.entries
            .remove(&subscription_id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("subscription {subscription_id}")))
    }

    pub fn get(&self, subscription_id: u32) -> Option<&Subscription> {
        self.entries.get(&subscription_id).map(|e| &e.subscription)
    }

    /// Record a change on every subscription covering `(endpoint_id,
    /// feature_id, attr_id)`.
    pub fn record_change(
        &mut self,
        endpoint_id: u8,
        feature_id: u8,
        attr_id: u16,
        baseline: Value,
        new_value: Value,
        now: Instant,
    ) {
        for entry in self.entries.values_mut() {
            let s = &entry.subscription;
            if s.endpoint_id == endpoint_id && s.feature_id == feature_id && s.attr_ids.contains(&attr_id) {
                entry.window.record_change(attr_id, baseline.clone(), new_value.clone(), now);
            }
        }
    }

    /// Drain window closures and due heartbeats into outgoing events.
    /// `current_values` supplies the full value set for a subscription's
    /// attributes, used for heartbeats.
    pub fn poll(
        &mut self,
        now: Instant,
        current_values: impl Fn(&Subscription) -> ValueSnapshot,
    ) -> Vec<SubscriptionEvent> {
        let mut events = Vec::new();
        for entry in self.entries.values_mut() {
            if let Some(values) = entry.window.poll_close(now) {
                events.push(SubscriptionEvent {
                    subscription_id: entry.subscription.id,
                    endpoint_id: entry.subscription.endpoint_id,
                    feature_id: entry.subscription.feature_id,
                    values,
                });
            } else if entry.window.heartbeat_due(now) {
                entry.window.mark_heartbeat_sent(now);
                events.push(SubscriptionEvent {
                    subscription_id: entry.subscription.id,
                    endpoint_id: entry.subscription.endpoint_id,
                    feature_id: entry.subscription.feature_id,
                    values: current_values(&entry.subscription),
                });
            }
        }
        events
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_allocates_increasing_ids() {
        let mut mgr = SubscriptionManager::new();
        let a = mgr.subscribe("zone-a", 1, 1, vec![1], Duration::from_secs(1), Duration::from_secs(60), false);
        let b = mgr.subscribe("zone-a", 1, 1, vec![1], Duration::from_secs(1), Duration::from_secs(60), false);
        assert!(b > a);
    }

    #[test]
    fn unsubscribe_removes_entry() {
        let mut mgr = SubscriptionManager::new();
        let id = mgr.subscribe("zone-a", 1, 1, vec![1], Duration::from_secs(1), Duration::from_secs(60), false);
        mgr.unsubscribe(id).unwrap();
        assert!(mgr.get(id).is_none());
    }

    #[test]
    fn unsubscribe_unknown_id_is_not_found() {
        let mut mgr = SubscriptionManager::new();
        assert!(matches!(mgr.unsubscribe(999).unwrap_err(), Error::NotFound(_)));
    }

    #[test]
    fn record_change_only_affects_matching_subscriptions() {
        let mut mgr = SubscriptionManager::new();
        let id = mgr.subscribe("zone-a", 1, 1, vec![5], Duration::from_millis(10), Duration::from_secs(60), false);
        let now = Instant::now();
        mgr.record_change(1, 1, 7, Value::Null, Value::Integer(1.into()), now);
        let events = mgr.poll(now + Duration::from_millis(50), |_| ValueSnapshot::new());
        assert!(events.is_empty());

        mgr.record_change(1, 1, 5, Value::Null, Value::Integer(2.into()), now);
        let events = mgr.poll(now + Duration::from_millis(50), |_| ValueSnapshot::new());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].subscription_id, id);
    }

    #[test]
    fn heartbeat_fires_with_current_values_when_idle() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe("zone-a", 1, 1, vec![5], Duration::from_millis(10), Duration::from_millis(20), false);
        let now = Instant::now();
        let events = mgr.poll(now + Duration::from_millis(30), |_| {
            let mut snap = ValueSnapshot::new();
            snap.insert(5, Value::Integer(42.into()));
            snap
        });
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].values.get(&5), Some(&Value::Integer(42.into())));
    }
}
