// SPDX-License-Identifier: Apache-2.0 OR MIT

//! TLS transport: connection state machine, keep-alive, and TLS
//! configuration for commissioning vs. operational mode (§4.1).

mod connection;
mod keepalive;
mod tls;

pub use connection::{ConnectionState, TransportConnection};
pub use keepalive::KeepAlive;
pub use tls::{commissioning_client_config, commissioning_server_config, operational_client_config, operational_server_config};
