// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-attribute, per-zone values and the multi-zone resolver (§3.3, §4.6,
//! invariants §8.1.3 and §8.1.4).

use std::collections::BTreeMap;
use std::time::SystemTime;

use crate::zone::{is_expired, ZoneType};

/// A value a single zone has set for some attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneValue {
    pub zone_id: String,
    pub zone_type: ZoneType,
    pub value: i64,
    pub duration: Option<std::time::Duration>,
    pub set_at: SystemTime,
    /// `None` means no expiry.
    pub expires_at: Option<SystemTime>,
    /// Monotonic insertion sequence, used to break setpoint-priority ties
    /// by "first wins" (§4.6).
    pub(crate) sequence: u64,
}

/// How the effective value for an attribute is computed across zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionRule {
    /// Minimum of all non-expired, non-TEST values; empty set → `None`.
    MinWins,
    /// Value from the zone with the highest priority (lowest
    /// `zoneType.priority()`); ties broken by insertion order.
    PriorityWins,
}

/// A mapping `zoneId → ZoneValue` with a cached effective value (§3.3).
#[derive(Debug, Clone, Default)]
pub struct MultiZoneValue {
    values: BTreeMap<String, ZoneValue>,
    next_sequence: u64,
}

impl MultiZoneValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(
        &mut self,
        zone_id: impl Into<String>,
        zone_type: ZoneType,
        value: i64,
        duration: Option<std::time::Duration>,
        expires_at: Option<SystemTime>,
    ) {
        let zone_id = zone_id.into();
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.values.insert(
            zone_id.clone(),
            ZoneValue {
                zone_id,
                zone_type,
                value,
                duration,
                set_at: SystemTime::now(),
                expires_at,
                sequence,
            },
        );
    }

    pub fn clear(&mut self, zone_id: &str) {
        self.values.remove(zone_id);
    }

    pub fn get(&self, zone_id: &str) -> Option<&ZoneValue> {
        self.values.get(zone_id)
    }

    fn non_expired(&self, now: SystemTime) -> impl Iterator<Item = &ZoneValue> {
        self.values
            .values()
            .filter(move |v| !is_expired(v.expires_at, now))
    }

    /// Resolve the effective value and winning zone per `rule` (§4.6).
    /// TEST zones never participate, for either rule.
    pub fn resolve(&self, rule: ResolutionRule, now: SystemTime) -> Option<(i64, String)> {
        let candidates: Vec<&ZoneValue> = self
            .non_expired(now)
            .filter(|v| !v.zone_type.is_observer_only())
            .collect();

        if candidates.is_empty() {
            return None;
        }

        match rule {
            ResolutionRule::MinWins => candidates
                .into_iter()
                .min_by_key(|v| v.value)
                .map(|v| (v.value, v.zone_id.clone())),
            ResolutionRule::PriorityWins => candidates
                .into_iter()
                .min_by_key(|v| (v.zone_type.priority(), v.sequence))
                .map(|v| (v.value, v.zone_id.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn mzv_with(entries: &[(&str, ZoneType, i64)]) -> MultiZoneValue {
        let mut mzv = MultiZoneValue::new();
        for (id, zt, value) in entries {
            mzv.set(*id, *zt, *value, None, None);
        }
        mzv
    }

    #[test]
    fn min_wins_picks_the_smallest_non_test_value() {
        let mzv = mzv_with(&[
            ("grid", ZoneType::Grid, 3000),
            ("local", ZoneType::Local, 5000),
        ]);
        let (value, winner) = mzv.resolve(ResolutionRule::MinWins, SystemTime::now()).unwrap();
        assert_eq!(value, 3000);
        assert_eq!(winner, "grid");
    }

    #[test]
    fn priority_wins_prefers_grid_over_local() {
        let mzv = mzv_with(&[
            ("local", ZoneType::Local, 10),
            ("grid", ZoneType::Grid, 20),
        ]);
        let (value, winner) = mzv
            .resolve(ResolutionRule::PriorityWins, SystemTime::now())
            .unwrap();
        assert_eq!(value, 20);
        assert_eq!(winner, "grid");
    }

    #[test]
    fn priority_ties_break_by_insertion_order() {
        let mut mzv = MultiZoneValue::new();
        mzv.set("grid-a", ZoneType::Grid, 1, None, None);
        mzv.set("grid-b", ZoneType::Grid, 2, None, None);
        let (_value, winner) = mzv
            .resolve(ResolutionRule::PriorityWins, SystemTime::now())
            .unwrap();
        assert_eq!(winner, "grid-a");
    }

    #[test]
    fn test_zones_never_win_resolution() {
        let mzv = mzv_with(&[("test", ZoneType::Test, 1)]);
        assert!(mzv.resolve(ResolutionRule::MinWins, SystemTime::now()).is_none());
        assert!(mzv
            .resolve(ResolutionRule::PriorityWins, SystemTime::now())
            .is_none());
    }

    #[test]
    fn empty_set_resolves_to_none() {
        let mzv = MultiZoneValue::new();
        assert!(mzv.resolve(ResolutionRule::MinWins, SystemTime::now()).is_none());
    }

    #[test]
    fn expired_values_are_excluded() {
        let mut mzv = MultiZoneValue::new();
        let now = SystemTime::now();
        mzv.set(
            "grid",
            ZoneType::Grid,
            100,
            None,
            Some(now - Duration::from_secs(1)),
        );
        assert!(mzv.resolve(ResolutionRule::MinWins, now).is_none());
    }

    #[test]
    fn expiry_at_exact_now_is_still_valid() {
        let mut mzv = MultiZoneValue::new();
        let now = SystemTime::now();
        mzv.set("grid", ZoneType::Grid, 100, None, Some(now));
        assert!(mzv.resolve(ResolutionRule::MinWins, now).is_some());
    }
}
