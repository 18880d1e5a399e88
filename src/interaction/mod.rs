// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Protocol handler (device side) and interaction client (controller
//! side) (§4.8).

mod client;
mod server;

pub use client::InteractionClient;
pub use server::ProtocolHandler;
