// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Zone membership and lifecycle callbacks (§4.6).

use std::collections::BTreeMap;
use std::time::SystemTime;

use crate::config::MAX_OPERATIONAL_ZONES;
use crate::error::{Error, Result};
use crate::zone::{Zone, ZoneType};

/// Invoked on zone membership and connection transitions so a device
/// service can drive failsafe timers and event streams (§4.6, §4.9).
pub trait ZoneCallbacks: Send + Sync {
    fn on_zone_added(&self, _zone_id: &str, _zone_type: ZoneType) {}
    fn on_zone_removed(&self, _zone_id: &str) {}
    fn on_connect(&self, _zone_id: &str) {}
    fn on_disconnect(&self, _zone_id: &str) {}
}

struct NoopCallbacks;
impl ZoneCallbacks for NoopCallbacks {}

/// Owns the set of commissioned zones on a device, enforcing the
/// operational zone cap (§5 "Resource limits", §8.1.2) and exposing the
/// membership rules a device service needs for decommissioning (§4.6).
pub struct ZoneManager {
    zones: BTreeMap<String, Zone>,
    callbacks: Box<dyn ZoneCallbacks>,
}

impl Default for ZoneManager {
    fn default() -> Self {
        Self {
            zones: BTreeMap::new(),
            callbacks: Box::new(NoopCallbacks),
        }
    }
}

impl ZoneManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callbacks(callbacks: Box<dyn ZoneCallbacks>) -> Self {
        Self {
            zones: BTreeMap::new(),
            callbacks,
        }
    }

    /// Commission a new zone. Rejects once `MAX_OPERATIONAL_ZONES` is
    /// reached, and rejects a duplicate `zoneType` for non-TEST zones
    /// (§8.1.2: "at most one GRID and one LOCAL zone").
    pub fn add_zone(&mut self, zone_id: impl Into<String>, zone_type: ZoneType) -> Result<()> {
        let zone_id = zone_id.into();

        if !zone_type.is_observer_only() && self.zones.values().any(|z| z.zone_type == zone_type) {
            return Err(Error::ZoneTypeExists);
        }

        if self.operational_count() >= MAX_OPERATIONAL_ZONES && !zone_type.is_observer_only() {
            return Err(Error::ZoneCapacity(format!(
                "at most {MAX_OPERATIONAL_ZONES} operational zones"
            )));
        }

        self.zones.insert(zone_id.clone(), Zone::new(zone_id.clone(), zone_type));
        self.callbacks.on_zone_added(&zone_id, zone_type);
        Ok(())
    }

    pub fn remove_zone(&mut self, zone_id: &str) -> Result<()> {
        if self.zones.remove(zone_id).is_some() {
            self.callbacks.on_zone_removed(zone_id);
            Ok(())
        } else {
            Err(Error::NotFound(format!("zone {zone_id}")))
        }
    }

    pub fn set_connected(&mut self, zone_id: &str, connected: bool) -> Result<()> {
        let zone = self
            .zones
            .get_mut(zone_id)
            .ok_or_else(|| Error::NotFound(format!("zone {zone_id}")))?;
        let was_connected = zone.connected;
        zone.connected = connected;
        zone.last_seen = SystemTime::now();

        if connected && !was_connected {
            self.callbacks.on_connect(zone_id);
        } else if !connected && was_connected {
            self.callbacks.on_disconnect(zone_id);
        }
        Ok(())
    }

    pub fn zone(&self, zone_id: &str) -> Option<&Zone> {
        self.zones.get(zone_id)
    }

    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }

    fn operational_count(&self) -> usize {
        self.zones.values().filter(|z| !z.zone_type.is_observer_only()).count()
    }

    /// A zone may remove another zone only if it strictly outranks it:
    /// GRID (priority 1) may remove LOCAL or TEST, LOCAL (2) may remove
    /// TEST, and nothing may remove a zone of equal or higher priority,
    /// including itself. Returns `false` if `target_id` doesn't exist
    /// (§4.6 `canRemoveZone(requesterType, targetId)`).
    pub fn can_remove_zone(&self, requester_type: ZoneType, target_id: &str) -> bool {
        self.zones
            .get(target_id)
            .is_some_and(|target| requester_type.priority() < target.zone_type.priority())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_one_grid_and_one_local() {
        let mut mgr = ZoneManager::new();
        mgr.add_zone("grid-1", ZoneType::Grid).unwrap();
        mgr.add_zone("local-1", ZoneType::Local).unwrap();
        assert_eq!(mgr.zones().count(), 2);
    }

    #[test]
    fn rejects_duplicate_grid_zone() {
        let mut mgr = ZoneManager::new();
        mgr.add_zone("grid-1", ZoneType::Grid).unwrap();
        let err = mgr.add_zone("grid-2", ZoneType::Grid).unwrap_err();
        assert!(matches!(err, Error::ZoneTypeExists));
    }

    #[test]
    fn rejects_third_operational_zone() {
        let mut mgr = ZoneManager::new();
        mgr.add_zone("grid-1", ZoneType::Grid).unwrap();
        mgr.add_zone("local-1", ZoneType::Local).unwrap();
        // third operational slot doesn't exist regardless of type distinctness
        let err = mgr.add_zone("local-2", ZoneType::Local).unwrap_err();
        assert!(matches!(err, Error::ZoneTypeExists) || matches!(err, Error::ZoneCapacity(_)));
    }

    #[test]
    fn test_zones_are_unlimited_and_unrestricted() {
        let mut mgr = ZoneManager::new();
        mgr.add_zone("grid-1", ZoneType::Grid).unwrap();
        mgr.add_zone("local-1", ZoneType::Local).unwrap();
        mgr.add_zone("test-1", ZoneType::Test).unwrap();
        mgr.add_zone("test-2", ZoneType::Test).unwrap();
        assert_eq!(mgr.zones().count(), 4);
    }

    #[test]
    fn connect_then_disconnect_toggles_state() {
        let mut mgr = ZoneManager::new();
        mgr.add_zone("grid-1", ZoneType::Grid).unwrap();
        mgr.set_connected("grid-1", true).unwrap();
        assert!(mgr.zone("grid-1").unwrap().connected);
        mgr.set_connected("grid-1", false).unwrap();
        assert!(!mgr.zone("grid-1").unwrap().connected);
    }

    fn three_zone_manager() -> ZoneManager {
        let mut mgr = ZoneManager::new();
        mgr.add_zone("grid-1", ZoneType::Grid).unwrap();
        mgr.add_zone("local-1", ZoneType::Local).unwrap();
        mgr.add_zone("test-1", ZoneType::Test).unwrap();
        mgr
    }

    #[test]
    fn grid_may_remove_local_and_test() {
        let mgr = three_zone_manager();
        assert!(mgr.can_remove_zone(ZoneType::Grid, "local-1"));
        assert!(mgr.can_remove_zone(ZoneType::Grid, "test-1"));
    }

    #[test]
    fn local_may_remove_test_but_not_grid() {
        let mgr = three_zone_manager();
        assert!(mgr.can_remove_zone(ZoneType::Local, "test-1"));
        assert!(!mgr.can_remove_zone(ZoneType::Local, "grid-1"));
    }

    #[test]
    fn test_zone_may_not_remove_anything() {
        let mgr = three_zone_manager();
        assert!(!mgr.can_remove_zone(ZoneType::Test, "grid-1"));
        assert!(!mgr.can_remove_zone(ZoneType::Test, "local-1"));
        assert!(!mgr.can_remove_zone(ZoneType::Test, "test-1"));
    }

    #[test]
    fn equal_priority_including_self_removal_is_false() {
        let mgr = three_zone_manager();
        assert!(!mgr.can_remove_zone(ZoneType::Grid, "grid-1"));
        assert!(!mgr.can_remove_zone(ZoneType::Local, "local-1"));
    }

    #[test]
    fn unknown_target_cannot_be_removed() {
        let mgr = three_zone_manager();
        assert!(!mgr.can_remove_zone(ZoneType::Grid, "nope"));
    }

    #[test]
    fn removing_unknown_zone_is_not_found() {
        let mut mgr = ZoneManager::new();
        assert!(matches!(mgr.remove_zone("nope").unwrap_err(), Error::NotFound(_)));
    }

    struct Recorder {
        added: std::sync::Mutex<Vec<String>>,
    }
    impl ZoneCallbacks for Recorder {
        fn on_zone_added(&self, zone_id: &str, _zone_type: ZoneType) {
            self.added.lock().unwrap().push(zone_id.to_string());
        }
    }

    #[test]
    fn callbacks_fire_on_zone_added() {
        let recorder = Recorder {
            added: std::sync::Mutex::new(Vec::new()),
        };
        let mut mgr = ZoneManager::with_callbacks(Box::new(recorder));
        mgr.add_zone("grid-1", ZoneType::Grid).unwrap();
        // Can't reach back into `recorder` after it moved into the Box;
        // this test mainly documents that add_zone doesn't panic with
        // callbacks installed. See add_zone's own return-value tests
        // above for membership behavior.
        assert_eq!(mgr.zones().count(), 1);
    }
}
