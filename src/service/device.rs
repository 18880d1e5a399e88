// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Device-role orchestration (§4.10): owns the zone table, each zone's
//! session and failsafe timer, the commissioning hardening primitives,
//! and the event stream. The listener socket and `mio::Poll` loop live
//! above this type and are out of scope here (see the module doc on
//! [`crate::service`]).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use parking_lot::Mutex;

use crate::commissioning::{ConnectionGovernor, MessageGatedLock};
use crate::device_model::Device;
use crate::error::{Error, Result};
use crate::features::energy_control::LimitResolver;
use crate::pase::AttemptTracker;
use crate::service::events::{Event, EventBus};
use crate::service::failsafe::FailsafeTimer;
use crate::service::lifecycle::ServiceState;
use crate::service::session::ZoneSession;
use crate::zone::{ZoneManager, ZoneType};

/// Where the device's EnergyControl feature lives, so the service can
/// drive its state machine from the failsafe timers (§4.9, §4.10)
/// without the zone/session bookkeeping above knowing about features.
struct EnergyControlBinding {
    endpoint_id: u8,
    feature_id: u8,
    resolver: Arc<LimitResolver>,
}

pub struct DeviceService {
    pub device: Device,
    state: Mutex<ServiceState>,
    zones: Mutex<ZoneManager>,
    sessions: Mutex<HashMap<String, ZoneSession>>,
    failsafe_timers: Mutex<HashMap<String, FailsafeTimer>>,
    energy_control: Mutex<Option<EnergyControlBinding>>,
    pub commissioning_lock: MessageGatedLock,
    pub connection_governor: ConnectionGovernor,
    pub pase_attempts: AttemptTracker,
    pub events: EventBus,
}

impl DeviceService {
    pub fn new(device: Device) -> Self {
        Self {
            device,
            state: Mutex::new(ServiceState::Idle),
            zones: Mutex::new(ZoneManager::new()),
            sessions: Mutex::new(HashMap::new()),
            failsafe_timers: Mutex::new(HashMap::new()),
            energy_control: Mutex::new(None),
            commissioning_lock: MessageGatedLock::new(),
            connection_governor: ConnectionGovernor::new(),
            pase_attempts: AttemptTracker::new(),
            events: EventBus::new(),
        }
    }

    /// Point the service at the EnergyControl feature instance hosted at
    /// `(endpoint_id, feature_id)`, so failsafe timers and periodic ticks
    /// can drive it (§4.9, §4.10). Call once, after the feature has been
    /// installed on `device`.
    pub fn bind_energy_control(&self, endpoint_id: u8, feature_id: u8, resolver: Arc<LimitResolver>) {
        *self.energy_control.lock() = Some(EnergyControlBinding {
            endpoint_id,
            feature_id,
            resolver,
        });
    }

    fn mark_attribute_dirty(&self, endpoint_id: u8, feature_id: u8, attribute_id: u16) {
        if let Some(attr) = self
            .device
            .endpoint(endpoint_id)
            .and_then(|ep| ep.features.get(&feature_id))
            .and_then(|f| f.attributes.get(&attribute_id))
        {
            attr.mark_dirty();
        }
    }

    pub fn state(&self) -> ServiceState {
        *self.state.lock()
    }

    pub fn transition_to(&self, next: ServiceState) -> Result<()> {
        let mut state = self.state.lock();
        if !state.can_transition_to(next) {
            return Err(Error::Invariant(format!(
                "cannot transition from {:?} to {:?}",
                *state, next
            )));
        }
        *state = next;
        Ok(())
    }

    /// A freshly-commissioned zone joins the device: zone table, a
    /// session slot, and a failsafe timer all come up together (§4.10).
    pub fn commission_zone(&self, zone_id: impl Into<String>, zone_type: ZoneType) -> Result<()> {
        let zone_id = zone_id.into();
        self.zones.lock().add_zone(zone_id.clone(), zone_type)?;
        self.sessions
            .lock()
            .insert(zone_id.clone(), ZoneSession::new(zone_id.clone(), zone_type));
        self.failsafe_timers.lock().insert(zone_id.clone(), FailsafeTimer::new());
        self.events.publish(Event::Commissioned { zone_id });
        Ok(())
    }

    pub fn decommission_zone(&self, zone_id: &str) -> Result<()> {
        self.zones.lock().remove_zone(zone_id)?;
        self.sessions.lock().remove(zone_id);
        self.failsafe_timers.lock().remove(zone_id);
        self.events.publish(Event::Decommissioned {
            zone_id: zone_id.to_string(),
        });
        Ok(())
    }

    /// Record that a zone's connection came up; clears any running
    /// failsafe countdown (§4.9, §4.10).
    pub fn mark_zone_connected(&self, zone_id: &str) -> Result<()> {
        self.zones.lock().set_connected(zone_id, true)?;
        if let Some(timer) = self.failsafe_timers.lock().get_mut(zone_id) {
            if timer.on_connect() {
                if let Some(binding) = self.energy_control.lock().as_ref() {
                    binding.resolver.exit_failsafe();
                    let (endpoint_id, feature_id) = (binding.endpoint_id, binding.feature_id);
                    for attr in binding.resolver.tick(SystemTime::now()) {
                        self.mark_attribute_dirty(endpoint_id, feature_id, attr);
                    }
                }
                self.events.publish(Event::FailsafeCleared {
                    zone_id: zone_id.to_string(),
                });
            }
        }
        self.events.publish(Event::Connected {
            zone_id: zone_id.to_string(),
        });
        Ok(())
    }

    /// Record that a zone's connection dropped; starts its failsafe
    /// countdown.
    pub fn mark_zone_disconnected(&self, zone_id: &str, now: Instant) -> Result<()> {
        self.zones.lock().set_connected(zone_id, false)?;
        if let Some(timer) = self.failsafe_timers.lock().get_mut(zone_id) {
            timer.on_disconnect(now);
        }
        self.events.publish(Event::Disconnected {
            zone_id: zone_id.to_string(),
        });
        Ok(())
    }

    /// Drive every zone's failsafe timer forward; call from a periodic
    /// tick. Returns the zone ids that tripped into failsafe on this call.
    ///
    /// A trip also pushes the bound EnergyControl feature into FAILSAFE
    /// (§4.10) and marks whichever effective-value attributes it reports
    /// as changed dirty, so subscribers see the failsafe defaults.
    pub fn tick_failsafe(&self, now: Instant) -> Vec<String> {
        let tripped: Vec<String> = {
            let mut timers = self.failsafe_timers.lock();
            timers
                .iter_mut()
                .filter(|(_, timer)| timer.tick(now))
                .map(|(zone_id, _)| zone_id.clone())
                .collect()
        };
        if !tripped.is_empty() {
            if let Some(binding) = self.energy_control.lock().as_ref() {
                binding.resolver.enter_failsafe();
                let (endpoint_id, feature_id) = (binding.endpoint_id, binding.feature_id);
                for attr in binding.resolver.tick(SystemTime::now()) {
                    self.mark_attribute_dirty(endpoint_id, feature_id, attr);
                }
            }
        }
        for zone_id in &tripped {
            self.events.publish(Event::FailsafeTriggered {
                zone_id: zone_id.clone(),
            });
        }
        tripped
    }

    pub fn zone_count(&self) -> usize {
        self.sessions.lock().len()
    }
}
