// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Global configuration: single source of truth for protocol timing
//! constants and the small set of values an integrator may override.
//!
//! Two layers, matching the protocol's own split (§5):
//! - **Static** constants below, fixed protocol defaults.
//! - [`RuntimeConfig`], for values that are safe to vary per deployment
//!   (commissioning window length, failsafe duration) without breaking
//!   interoperability.

use std::time::Duration;

// ------------------------------------------------------------------
// Interaction layer
// ------------------------------------------------------------------

/// Default interaction client request timeout.
pub const INTERACTION_CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

// ------------------------------------------------------------------
// Commissioning / PASE
// ------------------------------------------------------------------

/// Time budget to receive the first PASE message before the connection
/// is dropped. Never held under the commissioning lock.
pub const PASE_FIRST_MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Time budget for the full handshake once the commissioning lock is held.
pub const PASE_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(85);

/// Default commissioning window duration.
pub const COMMISSIONING_WINDOW_DEFAULT: Duration = Duration::from_secs(15 * 60);

/// Maximum cumulative commissioning window duration across re-triggers.
pub const COMMISSIONING_WINDOW_MAX: Duration = Duration::from_secs(3 * 60 * 60);

/// PASE attempt backoff tiers in milliseconds, indexed by consecutive
/// failure count (1-based; failure counts beyond the array clamp to the
/// last tier).
pub const PASE_BACKOFF_TIERS_MS: [u64; 4] = [0, 1_000, 3_000, 10_000];

/// Minimum time between a closed pre-operational connection and a new
/// inbound handshake attempt from the same address.
pub const CONNECTION_COOLDOWN: Duration = Duration::from_millis(500);

/// A pre-operational connection open this long without reaching the
/// operational state is closed by the stale-connection reaper.
pub const STALE_CONNECTION_TIMEOUT: Duration = Duration::from_secs(90);

// ------------------------------------------------------------------
// Transport keep-alive
// ------------------------------------------------------------------

/// Keep-alive ping interval.
pub const KEEPALIVE_PING_INTERVAL: Duration = Duration::from_secs(30);

/// Keep-alive pong timeout.
pub const KEEPALIVE_PONG_TIMEOUT: Duration = Duration::from_secs(5);

/// Consecutive missed pongs before the connection is force-closed.
pub const KEEPALIVE_MAX_MISSED_PONGS: u32 = 3;

// ------------------------------------------------------------------
// Framing
// ------------------------------------------------------------------

/// Maximum frame payload, in bytes.
pub const MAX_FRAME_PAYLOAD: usize = 65_536;

/// Minimum frame payload, in bytes.
pub const MIN_FRAME_PAYLOAD: usize = 1;

/// Length of the big-endian frame length prefix.
pub const FRAME_HEADER_SIZE: usize = 4;

// ------------------------------------------------------------------
// Zone manager / failsafe
// ------------------------------------------------------------------

/// Default failsafe duration: time a zone may be disconnected before the
/// device reverts to failsafe defaults.
pub const FAILSAFE_DURATION: Duration = Duration::from_secs(2 * 60 * 60);

/// Maximum operational zones a device accepts simultaneously (the
/// observer-only TEST zone does not count against this).
pub const MAX_OPERATIONAL_ZONES: usize = 2;

/// Maximum pre-operational (commissioning) connections open at once.
pub const MAX_PRE_OPERATIONAL_CONNECTIONS: usize = MAX_OPERATIONAL_ZONES + 1;

// ------------------------------------------------------------------
// Certificates
// ------------------------------------------------------------------

/// Zone CA validity period.
pub const ZONE_CA_VALIDITY: Duration = Duration::from_secs(20 * 365 * 24 * 60 * 60);

/// Operational certificate validity period.
pub const OPERATIONAL_CERT_VALIDITY: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Window before expiry during which an operational cert becomes eligible
/// for renewal.
pub const OPERATIONAL_CERT_RENEWAL_WINDOW: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Grace period after expiry during which an expired operational cert is
/// still tolerated while renewal completes.
pub const OPERATIONAL_CERT_GRACE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// ALPN protocol identifier required on every connection.
pub const ALPN_PROTOCOL: &[u8] = b"mash/1";

// ------------------------------------------------------------------
// mDNS service types (§6.3)
// ------------------------------------------------------------------

/// Commissionable device advertisement.
pub const MDNS_SERVICE_COMMISSIONABLE: &str = "_mashc._udp";
/// Operational device advertisement.
pub const MDNS_SERVICE_OPERATIONAL: &str = "_mash._tcp";
/// Controller/commissioner advertisement.
pub const MDNS_SERVICE_COMMISSIONER: &str = "_mashd._udp";
/// Pairing-request advertisement.
pub const MDNS_SERVICE_PAIRING: &str = "_mashp._udp";

// ------------------------------------------------------------------
// Dynamic runtime configuration
// ------------------------------------------------------------------

/// Runtime-adjustable configuration an integrator may tune per deployment.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Commissioning window duration for this device.
    pub commissioning_window: Duration,
    /// Failsafe duration for this device.
    pub failsafe_duration: Duration,
    /// Whether bounce-back suppression is enabled for locally-originated
    /// subscription updates (default off on device, on on controller —
    /// §4.7).
    pub bounce_back_suppression: bool,
    /// Default interaction client request timeout.
    pub interaction_timeout: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            commissioning_window: COMMISSIONING_WINDOW_DEFAULT,
            failsafe_duration: FAILSAFE_DURATION,
            bounce_back_suppression: false,
            interaction_timeout: INTERACTION_CLIENT_TIMEOUT,
        }
    }
}

impl RuntimeConfig {
    /// Defaults matching controller-side behavior (bounce-back
    /// suppression enabled, per §4.7).
    pub fn controller_defaults() -> Self {
        Self {
            bounce_back_suppression: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_tiers_are_monotonic() {
        for w in PASE_BACKOFF_TIERS_MS.windows(2) {
            assert!(w[1] >= w[0]);
        }
    }

    #[test]
    fn default_runtime_config_matches_device_defaults() {
        let cfg = RuntimeConfig::default();
        assert!(!cfg.bounce_back_suppression);
        assert_eq!(cfg.commissioning_window, COMMISSIONING_WINDOW_DEFAULT);
    }

    #[test]
    fn controller_defaults_enable_bounce_back_suppression() {
        assert!(RuntimeConfig::controller_defaults().bounce_back_suppression);
    }

    #[test]
    fn pre_operational_capacity_allows_one_extra_slot() {
        assert_eq!(MAX_PRE_OPERATIONAL_CONNECTIONS, MAX_OPERATIONAL_ZONES + 1);
    }
}
