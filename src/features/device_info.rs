// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DeviceInfo: the endpoint-0 feature every device exposes (§3.2, §4.10).

use ciborium::value::Value;

use crate::device_model::{Access, Attribute, Feature};

pub const FEATURE_TYPE: u8 = 0x00;

pub const ATTR_VENDOR_ID: u16 = 1;
pub const ATTR_PRODUCT_ID: u16 = 2;
pub const ATTR_SERIAL: u16 = 3;
pub const ATTR_FIRMWARE: u16 = 4;
pub const ATTR_DEVICE_ID: u16 = 5;

/// Build the read-only `DeviceInfo` feature for a device's identity
/// fields. Values are snapshotted at construction time; they don't
/// change for the lifetime of a commissioned device.
pub fn build_device_info_feature(
    vendor_id: u16,
    product_id: u16,
    serial: &str,
    firmware: &str,
    device_id: &str,
) -> Feature {
    Feature::new(FEATURE_TYPE, 1, 0)
        .with_attribute(Attribute::new(
            ATTR_VENDOR_ID,
            "vendorId",
            Access::READ_ONLY,
            Value::Integer((vendor_id as i64).into()),
        ))
        .with_attribute(Attribute::new(
            ATTR_PRODUCT_ID,
            "productId",
            Access::READ_ONLY,
            Value::Integer((product_id as i64).into()),
        ))
        .with_attribute(Attribute::new(
            ATTR_SERIAL,
            "serial",
            Access::READ_ONLY,
            Value::Text(serial.to_string()),
        ))
        .with_attribute(Attribute::new(
            ATTR_FIRMWARE,
            "firmware",
            Access::READ_ONLY,
            Value::Text(firmware.to_string()),
        ))
        .with_attribute(Attribute::new(
            ATTR_DEVICE_ID,
            "deviceId",
            Access::READ_ONLY,
            Value::Text(device_id.to_string()),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device_model::RequestContext;
    use crate::zone::ZoneType;

    #[test]
    fn exposes_identity_fields_read_only() {
        let feature = build_device_info_feature(1, 2, "SN-1", "1.0.0", "abc123");
        let ctx = RequestContext::new("zone-a", ZoneType::Grid);
        let vendor = feature.read_attribute(&ctx, ATTR_VENDOR_ID).unwrap();
        assert_eq!(vendor, Some(Value::Integer(1.into())));
        assert!(!feature.is_writable(ATTR_SERIAL));
    }
}
