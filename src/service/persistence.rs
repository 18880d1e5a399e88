// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Persisted-state schema boundary (§4.12, §6.5).
//!
//! These are plain serde-serializable shapes matching the JSON documents
//! described in §6.5 exactly. There is deliberately no load/save
//! orchestration here — persisting runtime state to disk is an excluded
//! feature; only the shape other components (a future caller, or the
//! certificate store's own PEM persistence) need to serialize against is
//! in scope.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub zone_type: String,
    pub controller: String,
    pub joined_at: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailsafeRecord {
    pub remaining_ms: u64,
    pub limits: HashMap<String, i64>,
}

/// `{version, savedAt, zones, failsafeState, zoneIndexMap}` per §6.5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevicePersistedState {
    pub version: u8,
    pub saved_at: u64,
    pub zones: Vec<ZoneRecord>,
    pub failsafe_state: HashMap<String, FailsafeRecord>,
    pub zone_index_map: HashMap<String, u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub joined_at: u64,
    pub last_seen: u64,
}

/// `{version, savedAt, zoneId, devices}` per §6.5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerPersistedState {
    pub version: u8,
    pub saved_at: u64,
    pub zone_id: String,
    pub devices: Vec<DeviceRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_state_round_trips_through_json() {
        let state = DevicePersistedState {
            version: 1,
            saved_at: 1_700_000_000,
            zones: vec![ZoneRecord {
                id: "grid-1".into(),
                zone_type: "GRID".into(),
                controller: "controller-1".into(),
                joined_at: 1_699_000_000,
            }],
            failsafe_state: HashMap::from([(
                "grid-1".to_string(),
                FailsafeRecord {
                    remaining_ms: 7_200_000,
                    limits: HashMap::from([("consumption".to_string(), 3000i64)]),
                },
            )]),
            zone_index_map: HashMap::from([("grid-1".to_string(), 1u8)]),
        };

        let json = serde_json::to_string(&state).unwrap();
        let decoded: DevicePersistedState = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn controller_state_round_trips_through_json() {
        let state = ControllerPersistedState {
            version: 1,
            saved_at: 1_700_000_000,
            zone_id: "zone-1".into(),
            devices: vec![DeviceRecord {
                id: "device-1".into(),
                device_type: "battery".into(),
                joined_at: 1_699_000_000,
                last_seen: 1_700_000_000,
            }],
        };

        let json = serde_json::to_string(&state).unwrap();
        let decoded: ControllerPersistedState = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn zone_type_field_uses_the_wire_key_name() {
        let record = ZoneRecord {
            id: "grid-1".into(),
            zone_type: "GRID".into(),
            controller: "controller-1".into(),
            joined_at: 0,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"type\":\"GRID\""));
    }
}
