// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Device: root of the ownership tree (§3.2). Endpoint 0 always exists and
//! hosts `DeviceInfo`.

use std::collections::BTreeMap;

use crate::device_model::endpoint::Endpoint;

pub struct Device {
    pub device_id: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub serial: String,
    pub firmware: String,
    pub endpoints: BTreeMap<u8, Endpoint>,
}

impl Device {
    pub fn new(
        device_id: impl Into<String>,
        vendor_id: u16,
        product_id: u16,
        serial: impl Into<String>,
        firmware: impl Into<String>,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            vendor_id,
            product_id,
            serial: serial.into(),
            firmware: firmware.into(),
            endpoints: BTreeMap::new(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoints.insert(endpoint.id, endpoint);
        self
    }

    pub fn endpoint(&self, id: u8) -> Option<&Endpoint> {
        self.endpoints.get(&id)
    }

    pub fn endpoint_mut(&mut self, id: u8) -> Option<&mut Endpoint> {
        self.endpoints.get_mut(&id)
    }

    pub fn has_endpoint_zero(&self) -> bool {
        self.endpoints.contains_key(&0)
    }
}
