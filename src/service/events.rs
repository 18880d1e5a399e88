// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Multi-subscriber event stream (§4.10).

use std::sync::{Arc, Mutex};

/// One of the event kinds a device or controller service emits (§4.10).
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Connected { zone_id: String },
    Disconnected { zone_id: String },
    Commissioned { zone_id: String },
    Decommissioned { zone_id: String },
    ValueChanged { zone_id: String, endpoint_id: u8, feature_id: u8, attr_id: u16 },
    FailsafeStarted { zone_id: String },
    FailsafeTriggered { zone_id: String },
    FailsafeCleared { zone_id: String },
    CommissioningOpened,
    CommissioningClosed,
    CertificateRenewed { zone_id: String },
}

type Subscriber = Arc<dyn Fn(&Event) + Send + Sync>;

/// Fan-out event stream: every subscriber is invoked, in registration
/// order, for every published event. The subscriber list is copied out
/// before dispatch so a subscriber may itself call `subscribe` or
/// `publish` without deadlocking (§5 "notification dispatch copies out
/// the subscriber list before invoking callbacks").
#[derive(Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<Subscriber>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, callback: impl Fn(&Event) + Send + Sync + 'static) {
        self.subscribers.lock().unwrap().push(Arc::new(callback));
    }

    pub fn publish(&self, event: Event) {
        let subscribers = self.subscribers.lock().unwrap().clone();
        for subscriber in &subscribers {
            subscriber(&event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn every_subscriber_receives_the_event() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let count = Arc::clone(&count);
            bus.subscribe(move |_event| {
                count.fetch_add(1, Ordering::Relaxed);
            });
        }
        bus.publish(Event::CommissioningOpened);
        assert_eq!(count.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn subscriber_count_reflects_registrations() {
        let bus = EventBus::new();
        bus.subscribe(|_| {});
        bus.subscribe(|_| {});
        assert_eq!(bus.subscriber_count(), 2);
    }
}
