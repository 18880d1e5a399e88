// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Zone membership and multi-zone value resolution (§3.3, §4.6).

mod manager;
mod value;

pub use manager::ZoneManager;
pub use value::{MultiZoneValue, ZoneValue};

use std::time::SystemTime;

/// A zone's type, with priority derived as GRID=1, LOCAL=2, TEST=3 —
/// lower number wins setpoint resolution (§3.3, §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneType {
    Grid,
    Local,
    Test,
}

impl ZoneType {
    pub fn priority(self) -> u8 {
        match self {
            ZoneType::Grid => 1,
            ZoneType::Local => 2,
            ZoneType::Test => 3,
        }
    }

    /// TEST zones are observer-only and never participate in effective
    /// value resolution (§3.3).
    pub fn is_observer_only(self) -> bool {
        matches!(self, ZoneType::Test)
    }
}

/// A controller's identity domain on a device (§3.3).
#[derive(Debug, Clone)]
pub struct Zone {
    pub id: String,
    pub zone_type: ZoneType,
    pub connected: bool,
    pub last_seen: SystemTime,
    pub commissioned_at: SystemTime,
    pub failsafe_active: bool,
}

impl Zone {
    pub fn new(id: impl Into<String>, zone_type: ZoneType) -> Self {
        let now = SystemTime::now();
        Self {
            id: id.into(),
            zone_type,
            connected: false,
            last_seen: now,
            commissioned_at: now,
            failsafe_active: false,
        }
    }
}

/// An expiry timestamp of `0` (represented here as `None`) means "no
/// expiry" (§3.3).
pub fn is_expired(expires_at: Option<SystemTime>, now: SystemTime) -> bool {
    match expires_at {
        // Strict inequality: `expiresAt == now` is still valid (§8.3).
        Some(t) => t < now,
        None => false,
    }
}
