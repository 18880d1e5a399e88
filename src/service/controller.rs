// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Controller-role orchestration (§4.10): devices the controller has
//! paired with, and outstanding pairing attempts keyed by discriminator.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::service::events::{Event, EventBus};
use crate::service::session::ZoneSession;
use crate::zone::ZoneType;

/// An in-progress commissioning attempt against a discriminator. The
/// cancellation token is shared with whatever task is driving the PASE
/// handshake, so cancelling here stops it mid-flight.
pub struct PairingRequest {
    pub discriminator: u16,
    cancelled: Arc<AtomicBool>,
}

impl PairingRequest {
    fn new(discriminator: u16) -> Self {
        Self {
            discriminator,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn cancellation_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }
}

/// Owns the controller's view of paired devices and in-flight pairing
/// attempts (§4.10). One [`PairingRequest`] may be outstanding per
/// discriminator at a time.
pub struct ControllerService {
    devices: Mutex<HashMap<String, ZoneSession>>,
    pairing: Mutex<HashMap<u16, PairingRequest>>,
    pub events: EventBus,
}

impl Default for ControllerService {
    fn default() -> Self {
        Self::new()
    }
}

impl ControllerService {
    pub fn new() -> Self {
        Self {
            devices: Mutex::new(HashMap::new()),
            pairing: Mutex::new(HashMap::new()),
            events: EventBus::new(),
        }
    }

    /// Start pairing against `discriminator`. Rejects with `Busy` if a
    /// pairing attempt against that discriminator is already underway.
    pub fn begin_pairing(&self, discriminator: u16) -> Result<Arc<AtomicBool>> {
        let mut pairing = self.pairing.lock();
        if pairing.contains_key(&discriminator) {
            return Err(Error::Busy { retry_after_ms: 0 });
        }
        let request = PairingRequest::new(discriminator);
        let token = request.cancellation_token();
        pairing.insert(discriminator, request);
        Ok(token)
    }

    pub fn cancel_pairing(&self, discriminator: u16) {
        if let Some(request) = self.pairing.lock().get(&discriminator) {
            request.cancel();
        }
    }

    pub fn is_pairing(&self, discriminator: u16) -> bool {
        self.pairing.lock().contains_key(&discriminator)
    }

    /// A pairing attempt succeeded: the discriminator's slot frees up and
    /// the device joins the connected-device table.
    pub fn complete_pairing(&self, discriminator: u16, device_id: impl Into<String>, zone_type: ZoneType) {
        self.pairing.lock().remove(&discriminator);
        let device_id = device_id.into();
        self.devices
            .lock()
            .insert(device_id.clone(), ZoneSession::new(device_id.clone(), zone_type));
        self.events.publish(Event::Commissioned { zone_id: device_id });
    }

    /// A pairing attempt failed or was cancelled: free the discriminator's
    /// slot without adding a device.
    pub fn abandon_pairing(&self, discriminator: u16) {
        self.pairing.lock().remove(&discriminator);
    }

    pub fn remove_device(&self, device_id: &str) {
        if self.devices.lock().remove(device_id).is_some() {
            self.events.publish(Event::Decommissioned {
                zone_id: device_id.to_string(),
            });
        }
    }

    pub fn device_count(&self) -> usize {
        self.devices.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_pairing_twice_on_the_same_discriminator_is_busy() {
        let controller = ControllerService::new();
        controller.begin_pairing(1234).unwrap();
        assert!(matches!(controller.begin_pairing(1234), Err(Error::Busy { .. })));
    }

    #[test]
    fn distinct_discriminators_pair_independently() {
        let controller = ControllerService::new();
        assert!(controller.begin_pairing(1234).is_ok());
        assert!(controller.begin_pairing(5678).is_ok());
    }

    #[test]
    fn cancelling_marks_the_token() {
        let controller = ControllerService::new();
        let token = controller.begin_pairing(1234).unwrap();
        controller.cancel_pairing(1234);
        assert!(token.load(Ordering::SeqCst));
    }

    #[test]
    fn completing_pairing_frees_the_discriminator_and_adds_the_device() {
        let controller = ControllerService::new();
        controller.begin_pairing(1234).unwrap();
        controller.complete_pairing(1234, "device-1", ZoneType::Local);
        assert!(!controller.is_pairing(1234));
        assert_eq!(controller.device_count(), 1);
    }

    #[test]
    fn abandoning_pairing_frees_the_slot_without_a_device() {
        let controller = ControllerService::new();
        controller.begin_pairing(1234).unwrap();
        controller.abandon_pairing(1234);
        assert!(!controller.is_pairing(1234));
        assert_eq!(controller.device_count(), 0);
    }

    #[test]
    fn removing_a_device_decrements_the_count() {
        let controller = ControllerService::new();
        controller.complete_pairing(1234, "device-1", ZoneType::Local);
        controller.remove_device("device-1");
        assert_eq!(controller.device_count(), 0);
    }
}
