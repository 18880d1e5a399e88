// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # MASH - a commissioning-gated multi-zone energy management protocol
//!
//! MASH connects energy devices (batteries, EVSEs, heat pumps, inverters)
//! to one or more controllers ("zones") over a mutually authenticated TLS
//! transport, after an initial SPAKE2+ PASE commissioning exchange
//! establishes each zone's operational certificate.
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |                          Service Layer                              |
//! |   DeviceService / ControllerService, failsafe timers, event stream  |
//! +---------------------------------------------------------------------+
//! |                        Interaction Layer                            |
//! |   Read | Write | Subscribe | Invoke, subscription coalescing        |
//! +---------------------------------------------------------------------+
//! |                         Device Model                                 |
//! |   Device -> Endpoint -> Feature -> Attribute/Command                |
//! +---------------------------------------------------------------------+
//! |                    Zone / Commissioning / Cert                      |
//! |   Multi-zone value resolution, PASE, Zone CA, operational certs     |
//! +---------------------------------------------------------------------+
//! |                   Wire / Transport / Discovery                      |
//! |   CBOR envelopes, length-prefixed TLS framing, mDNS service types    |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`device_model::Device`] | Root of a device's Endpoint/Feature/Attribute tree |
//! | [`zone::ZoneManager`] | Commissioned-zone membership and the operational cap |
//! | [`zone::MultiZoneValue`] | Per-zone limit/setpoint values and their resolution rule |
//! | [`service::DeviceService`] | Device-role session, failsafe, and event orchestration |
//! | [`service::ControllerService`] | Controller-role pairing and device-table orchestration |
//!
//! ## Modules Overview
//!
//! - [`device_model`] - Device -> Endpoint -> Feature -> Attribute/Command tree
//! - [`zone`] - Zone membership and multi-zone limit/setpoint resolution
//! - [`commissioning`] - SPAKE2+ PASE engine, connection hardening, renewal
//! - [`cert`] - Zone CA and operational certificate lifecycle
//! - [`transport`] - TLS connection state machine and keep-alive
//! - [`wire`] - CBOR envelope codec and length-prefixed framing
//! - [`interaction`] - Read/Write/Subscribe/Invoke client and server
//! - [`subscription`] - Coalescing windows and heartbeat scheduling
//! - [`discovery`] - mDNS service advertisement and browsing
//! - [`features`] - Concrete feature implementations (`EnergyControl`, etc.)
//! - [`service`] - Device/controller orchestration, failsafe, event stream

pub mod cert;
pub mod commissioning;
pub mod config;
pub mod device_model;
pub mod discovery;
pub mod error;
pub mod features;
pub mod interaction;
pub mod logging;
pub mod pase;
pub mod service;
pub mod subscription;
pub mod transport;
pub mod wire;
pub mod zone;

pub use error::{Error, Result};

/// Crate version, matching `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Wire protocol version advertised in commissioning and TXT records (§3.1).
pub const PROTOCOL_VERSION: u8 = 1;
