// SPDX-License-Identifier: Apache-2.0 OR MIT

//! TestControl: a supplemented endpoint-0 feature gating a test-event
//! trigger to operational TEST/GRID zones (SPEC_FULL.md §4.11).

use ciborium::value::Value;

use crate::device_model::{Command, Feature};
use crate::wire::StatusCode;
use crate::zone::ZoneType;

pub const FEATURE_TYPE: u8 = 0x02;
pub const CMD_TRIGGER_TEST_EVENT: u8 = 1;

/// `TriggerTestEvent(eventId: u32, arg: Option<i64>)`, authorized only
/// for TEST or GRID zones — a LOCAL controller has no business injecting
/// synthetic test events into a live energy device.
pub fn build_test_control_feature() -> Feature {
    Feature::new(FEATURE_TYPE, 1, 0).with_command(Command::new(
        CMD_TRIGGER_TEST_EVENT,
        "TriggerTestEvent",
        |ctx, params| {
            if !matches!(ctx.zone_type, ZoneType::Test | ZoneType::Grid) {
                return Err(StatusCode::NotAuthorized);
            }

            let Some(Value::Map(entries)) = params else {
                return Err(StatusCode::InvalidParameter);
            };
            let event_id = entries
                .iter()
                .find_map(|(k, v)| (k.as_text() == Some("eventId")).then(|| v.as_integer()).flatten())
                .ok_or(StatusCode::InvalidParameter)?;

            Ok(Value::Map(vec![(
                Value::Text("eventId".into()),
                Value::Integer(event_id),
            )]))
        },
    ))
}
