// SPDX-License-Identifier: Apache-2.0 OR MIT

//! TXT record schemas for each service type (§6.3).

use std::collections::HashMap;

/// `_mashc._udp` — commissionable device.
#[derive(Debug, Clone)]
pub struct CommissionableTxt {
    pub discriminator: u16,
    pub device_category: String,
    pub serial: String,
    pub brand: String,
    pub model: String,
    pub device_name: String,
}

impl CommissionableTxt {
    pub fn to_map(&self) -> HashMap<String, String> {
        HashMap::from([
            ("D".to_string(), self.discriminator.to_string()),
            ("cat".to_string(), self.device_category.clone()),
            ("serial".to_string(), self.serial.clone()),
            ("brand".to_string(), self.brand.clone()),
            ("model".to_string(), self.model.clone()),
            ("DN".to_string(), self.device_name.clone()),
        ])
    }
}

/// `_mash._tcp` — operational device.
#[derive(Debug, Clone)]
pub struct OperationalTxt {
    pub zone_id: String,
    pub device_id: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub firmware: String,
    pub feature_map: u32,
    pub endpoints: Vec<u8>,
}

impl OperationalTxt {
    pub fn to_map(&self) -> HashMap<String, String> {
        let endpoints = self
            .endpoints
            .iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(",");
        HashMap::from([
            ("ZI".to_string(), self.zone_id.clone()),
            ("DI".to_string(), self.device_id.clone()),
            ("VP".to_string(), format!("{}:{}", self.vendor_id, self.product_id)),
            ("FW".to_string(), self.firmware.clone()),
            ("FM".to_string(), self.feature_map.to_string()),
            ("EP".to_string(), endpoints),
        ])
    }
}

/// `_mashd._udp` — controller / commissioner.
#[derive(Debug, Clone)]
pub struct ControllerTxt {
    pub zone_name: String,
    pub zone_id: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub device_name: String,
    pub device_category: String,
}

impl ControllerTxt {
    pub fn to_map(&self) -> HashMap<String, String> {
        HashMap::from([
            ("ZN".to_string(), self.zone_name.clone()),
            ("ZI".to_string(), self.zone_id.clone()),
            ("VP".to_string(), format!("{}:{}", self.vendor_id, self.product_id)),
            ("DN".to_string(), self.device_name.clone()),
            ("DC".to_string(), self.device_category.clone()),
        ])
    }
}

/// `_mashp._udp` — pairing request.
#[derive(Debug, Clone)]
pub struct PairingTxt {
    pub discriminator: u16,
    pub zone_id: String,
    pub zone_name: String,
}

impl PairingTxt {
    pub fn to_map(&self) -> HashMap<String, String> {
        HashMap::from([
            ("D".to_string(), self.discriminator.to_string()),
            ("ZI".to_string(), self.zone_id.clone()),
            ("ZN".to_string(), self.zone_name.clone()),
        ])
    }
}
