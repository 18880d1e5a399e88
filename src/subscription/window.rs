// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-subscription coalescing window (§4.7).

use std::time::{Duration, Instant};

use crate::subscription::ValueSnapshot;

/// Accumulates attribute changes for one subscription between emitted
/// notifications. A window opens on the first change after the previous
/// notification and closes `min_interval` later; at close, the latest
/// value per attribute is emitted — unless bounce-back suppression is on
/// and every changed attribute has returned to its window-start value.
pub struct CoalescingWindow {
    min_interval: Duration,
    max_interval: Duration,
    suppress_bounce_back: bool,
    opened_at: Option<Instant>,
    window_start_values: ValueSnapshot,
    pending: ValueSnapshot,
    last_emitted_at: Instant,
}

impl CoalescingWindow {
    pub fn new(min_interval: Duration, max_interval: Duration, suppress_bounce_back: bool) -> Self {
        Self {
            min_interval,
            max_interval,
            suppress_bounce_back,
            opened_at: None,
            window_start_values: ValueSnapshot::new(),
            pending: ValueSnapshot::new(),
            last_emitted_at: Instant::now(),
        }
    }

    /// Record a change. `baseline` is the attribute's value as of just
    /// before this change, used for bounce-back comparison.
    pub fn record_change(&mut self, attr_id: u16, baseline: ciborium::value::Value, new_value: ciborium::value::Value, now: Instant) {
        if self.opened_at.is_none() {
            self.opened_at = Some(now);
        }
        self.window_start_values.entry(attr_id).or_insert(baseline);
        self.pending.insert(attr_id, new_value);
    }

    /// Returns `Some(snapshot)` if the window should close now, draining
    /// pending state; `None` if it's still accumulating. Call this
    /// periodically (e.g. from a timer tick) for every open window.
    pub fn poll_close(&mut self, now: Instant) -> Option<ValueSnapshot> {
        let opened_at = self.opened_at?;
        if now.duration_since(opened_at) < self.min_interval {
            return None;
        }
        self.close(now)
    }

    fn close(&mut self, now: Instant) -> Option<ValueSnapshot> {
        let mut emitted = std::mem::take(&mut self.pending);
        let starts = std::mem::take(&mut self.window_start_values);
        self.opened_at = None;
        self.last_emitted_at = now;

        if self.suppress_bounce_back {
            emitted.retain(|attr_id, value| match starts.get(attr_id) {
                Some(start) => start != value,
                None => true,
            });
        }

        if emitted.is_empty() {
            None
        } else {
            Some(emitted)
        }
    }

    /// Whether `maxInterval` has elapsed with no emission, meaning a
    /// heartbeat notification is due.
    pub fn heartbeat_due(&self, now: Instant) -> bool {
        self.opened_at.is_none() && now.duration_since(self.last_emitted_at) >= self.max_interval
    }

    pub fn mark_heartbeat_sent(&mut self, now: Instant) {
        self.last_emitted_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ciborium::value::Value;

    #[test]
    fn window_does_not_close_before_min_interval() {
        let mut window = CoalescingWindow::new(Duration::from_millis(100), Duration::from_secs(60), false);
        let t0 = Instant::now();
        window.record_change(1, Value::Integer(0.into()), Value::Integer(1.into()), t0);
        assert!(window.poll_close(t0 + Duration::from_millis(50)).is_none());
    }

    #[test]
    fn window_closes_with_latest_value_after_min_interval() {
        let mut window = CoalescingWindow::new(Duration::from_millis(100), Duration::from_secs(60), false);
        let t0 = Instant::now();
        window.record_change(1, Value::Integer(0.into()), Value::Integer(1.into()), t0);
        window.record_change(1, Value::Integer(1.into()), Value::Integer(2.into()), t0);
        let snapshot = window.poll_close(t0 + Duration::from_millis(150)).unwrap();
        assert_eq!(snapshot.get(&1), Some(&Value::Integer(2.into())));
    }

    #[test]
    fn bounce_back_suppresses_a_value_that_returns_to_start() {
        let mut window = CoalescingWindow::new(Duration::from_millis(100), Duration::from_secs(60), true);
        let t0 = Instant::now();
        window.record_change(1, Value::Integer(5.into()), Value::Integer(9.into()), t0);
        window.record_change(1, Value::Integer(9.into()), Value::Integer(5.into()), t0);
        let snapshot = window.poll_close(t0 + Duration::from_millis(150));
        assert!(snapshot.is_none());
    }

    #[test]
    fn bounce_back_disabled_still_emits_unchanged_roundtrip() {
        let mut window = CoalescingWindow::new(Duration::from_millis(100), Duration::from_secs(60), false);
        let t0 = Instant::now();
        window.record_change(1, Value::Integer(5.into()), Value::Integer(5.into()), t0);
        let snapshot = window.poll_close(t0 + Duration::from_millis(150));
        assert!(snapshot.is_some());
    }

    #[test]
    fn heartbeat_due_after_max_interval_with_no_changes() {
        let window = CoalescingWindow::new(Duration::from_millis(100), Duration::from_millis(200), false);
        let t0 = Instant::now();
        assert!(!window.heartbeat_due(t0 + Duration::from_millis(50)));
        assert!(window.heartbeat_due(t0 + Duration::from_millis(250)));
    }
}
