// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A single zone's live connection (§4.1, §4.10): bidirectional in that
//! the device both serves incoming requests over it (via
//! [`ProtocolHandler`]) and issues its own outbound requests over it (via
//! [`InteractionClient`], used for controller-initiated reads/writes or
//! a device reporting into a controller's session).

use crate::interaction::{InteractionClient, ProtocolHandler};
use crate::transport::TransportConnection;
use crate::zone::ZoneType;

pub struct ZoneSession {
    pub zone_id: String,
    pub zone_type: ZoneType,
    pub connection: TransportConnection,
    pub server: ProtocolHandler,
    pub client: InteractionClient,
}

impl ZoneSession {
    pub fn new(zone_id: impl Into<String>, zone_type: ZoneType) -> Self {
        Self {
            zone_id: zone_id.into(),
            zone_type,
            connection: TransportConnection::new(),
            server: ProtocolHandler::new(),
            client: InteractionClient::new(),
        }
    }

    pub fn is_operational(&self) -> bool {
        self.connection.is_operational()
    }

    /// Tear down the session. Idempotent across concurrent callers: only
    /// the caller that actually transitions the connection gets `true`
    /// and is responsible for failing pending client requests.
    pub fn close(&self) -> bool {
        let closed = self.connection.close();
        if closed {
            self.client.fail_all();
        }
        closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_not_operational() {
        let session = ZoneSession::new("zone-1", ZoneType::Local);
        assert!(!session.is_operational());
    }

    #[test]
    fn connecting_then_marking_connected_becomes_operational() {
        let session = ZoneSession::new("zone-1", ZoneType::Grid);
        session.connection.begin_connecting();
        session.connection.mark_connected();
        assert!(session.is_operational());
    }

    #[test]
    fn closing_is_idempotent_across_callers() {
        let session = ZoneSession::new("zone-1", ZoneType::Local);
        session.connection.begin_connecting();
        session.connection.mark_connected();
        assert!(session.close());
        assert!(!session.close());
        assert_eq!(session.client.pending_count(), 0);
    }
}
