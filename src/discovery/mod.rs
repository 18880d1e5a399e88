// SPDX-License-Identifier: Apache-2.0 OR MIT

//! mDNS discovery: service type constants, TXT record schemas, and the
//! commissioning-window state machine (§4.3, §6.3).

mod advertiser;
mod txt;
mod window;

pub use advertiser::{MashAdvertiser, MashBrowser};
pub use txt::{CommissionableTxt, ControllerTxt, OperationalTxt, PairingTxt};
pub use window::{CommissioningWindow, WindowState};

/// Commissionable device (§4.3).
pub const SERVICE_COMMISSIONABLE: &str = "_mashc._udp.local.";
/// Operational device (§4.3).
pub const SERVICE_OPERATIONAL: &str = "_mash._tcp.local.";
/// Controller / commissioner (§4.3).
pub const SERVICE_CONTROLLER: &str = "_mashd._udp.local.";
/// Pairing request (§4.3).
pub const SERVICE_PAIRING: &str = "_mashp._udp.local.";
