// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Failsafe trigger and clear across a disconnect/reconnect cycle
//! (§8.4 scenario 5).

use std::time::{Duration, Instant};

use mash::config::FAILSAFE_DURATION;
use mash::device_model::{Device, Endpoint, RequestContext};
use mash::features::energy_control::{build_energy_control_feature, ControlState, LimitKind, LimitResolver, FEATURE_TYPE};
use mash::service::{DeviceService, Event};
use mash::zone::ZoneType;

fn sample_device() -> Device {
    Device::new("dev-1", 1, 1, "SN1", "1.0.0")
}

#[test]
fn disconnect_past_failsafe_duration_triggers_and_reconnect_clears() {
    let service = DeviceService::new(sample_device());
    service.commission_zone("grid-1", ZoneType::Grid).unwrap();

    let events = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
    let recorded = std::sync::Arc::clone(&events);
    service.events.subscribe(move |event| {
        recorded.lock().push(event.clone());
    });

    let t0 = Instant::now();
    service.mark_zone_disconnected("grid-1", t0).unwrap();
    let tripped = service.tick_failsafe(t0 + FAILSAFE_DURATION + Duration::from_secs(1));
    assert_eq!(tripped, vec!["grid-1".to_string()]);

    service.mark_zone_connected("grid-1").unwrap();

    let recorded = events.lock();
    assert!(recorded.contains(&Event::Disconnected {
        zone_id: "grid-1".to_string()
    }));
    assert!(recorded.contains(&Event::FailsafeTriggered {
        zone_id: "grid-1".to_string()
    }));
    assert!(recorded.contains(&Event::FailsafeCleared {
        zone_id: "grid-1".to_string()
    }));
    assert!(recorded.contains(&Event::Connected {
        zone_id: "grid-1".to_string()
    }));
}

#[test]
fn reconnect_well_before_the_failsafe_duration_never_trips() {
    let service = DeviceService::new(sample_device());
    service.commission_zone("local-1", ZoneType::Local).unwrap();

    let t0 = Instant::now();
    service.mark_zone_disconnected("local-1", t0).unwrap();
    service.mark_zone_connected("local-1").unwrap();

    let tripped = service.tick_failsafe(t0 + FAILSAFE_DURATION + Duration::from_secs(1));
    assert!(tripped.is_empty());
}

#[test]
fn failsafe_trip_carries_through_to_the_energy_control_feature() {
    let resolver = LimitResolver::new(500, 750);
    let device = sample_device()
        .with_endpoint(Endpoint::new(1, "energySource", "main").with_feature(build_energy_control_feature(resolver.clone())));
    let service = DeviceService::new(device);
    service.bind_energy_control(1, FEATURE_TYPE, resolver.clone());
    service.commission_zone("grid-1", ZoneType::Grid).unwrap();
    resolver.set_limit(LimitKind::Consumption, &RequestContext::new("grid-1", ZoneType::Grid), 3000, None);
    assert_eq!(resolver.control_state(), ControlState::Controlled);

    let t0 = Instant::now();
    service.mark_zone_disconnected("grid-1", t0).unwrap();
    service.tick_failsafe(t0 + FAILSAFE_DURATION + Duration::from_secs(1));
    assert_eq!(resolver.control_state(), ControlState::Failsafe);

    service.mark_zone_connected("grid-1").unwrap();
    assert_eq!(resolver.control_state(), ControlState::Controlled);
}
