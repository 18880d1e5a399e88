// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Thin wrapper around `mdns-sd` for advertising and browsing the four
//! MASH service types (§4.3).

use std::collections::HashMap;

use mdns_sd::{ServiceDaemon, ServiceEvent, ServiceInfo};

use crate::error::{Error, Result};

/// Advertises this host under one or more of the four service types
/// (§4.3). Owns the underlying `mdns-sd` daemon thread; dropping it
/// stops advertising.
pub struct MashAdvertiser {
    daemon: ServiceDaemon,
    registered: Vec<String>,
}

impl MashAdvertiser {
    pub fn new() -> Result<Self> {
        let daemon = ServiceDaemon::new().map_err(|e| Error::Config(e.to_string()))?;
        Ok(Self {
            daemon,
            registered: Vec::new(),
        })
    }

    /// Register (or re-register, for a commissioning-window re-trigger)
    /// a service instance with the given TXT record map.
    pub fn advertise(
        &mut self,
        service_type: &str,
        instance_name: &str,
        host: &str,
        port: u16,
        txt: HashMap<String, String>,
    ) -> Result<()> {
        let info = ServiceInfo::new(service_type, instance_name, host, "", port, Some(txt))
            .map_err(|e| Error::Config(e.to_string()))?
            .enable_addr_auto();
        let fullname = info.get_fullname().to_string();
        self.daemon
            .register(info)
            .map_err(|e| Error::Config(e.to_string()))?;
        self.registered.push(fullname);
        Ok(())
    }

    /// Withdraw a previously-advertised instance (commissioning window
    /// closed, or device decommissioned).
    pub fn withdraw(&mut self, fullname: &str) -> Result<()> {
        self.daemon
            .unregister(fullname)
            .map_err(|e| Error::Config(e.to_string()))?;
        self.registered.retain(|n| n != fullname);
        Ok(())
    }
}

impl Drop for MashAdvertiser {
    fn drop(&mut self) {
        for fullname in self.registered.drain(..) {
            let _ = self.daemon.unregister(&fullname);
        }
        let _ = self.daemon.shutdown();
    }
}

/// A resolved peer discovered on one of the four service types.
#[derive(Debug, Clone)]
pub struct DiscoveredPeer {
    pub fullname: String,
    pub host: String,
    pub port: u16,
    pub txt: HashMap<String, String>,
}

/// Browses a single service type, exposing resolved peers as they
/// appear (§4.3). Holds the `mdns-sd` daemon's receive channel; callers
/// poll it from the discovery event loop.
pub struct MashBrowser {
    daemon: ServiceDaemon,
    receiver: mdns_sd::Receiver<ServiceEvent>,
}

impl MashBrowser {
    pub fn new(service_type: &str) -> Result<Self> {
        let daemon = ServiceDaemon::new().map_err(|e| Error::Config(e.to_string()))?;
        let receiver = daemon.browse(service_type).map_err(|e| Error::Config(e.to_string()))?;
        Ok(Self { daemon, receiver })
    }

    /// Non-blocking poll for the next resolved peer; returns `None` if
    /// nothing is pending.
    pub fn try_next_resolved(&self) -> Option<DiscoveredPeer> {
        while let Ok(event) = self.receiver.try_recv() {
            if let ServiceEvent::ServiceResolved(info) = event {
                let host = info.get_hostname().to_string();
                let port = info.get_port();
                let txt = info
                    .get_properties()
                    .iter()
                    .map(|p| (p.key().to_string(), p.val_str().to_string()))
                    .collect();
                return Some(DiscoveredPeer {
                    fullname: info.get_fullname().to_string(),
                    host,
                    port,
                    txt,
                });
            }
        }
        None
    }
}

impl Drop for MashBrowser {
    fn drop(&mut self) {
        let _ = self.daemon.shutdown();
    }
}
