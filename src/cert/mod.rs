// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Certificate manager: Zone CA, operational certificates, fingerprint
//! derivation, and a pluggable [`Store`] (§3.4, §4.4).

mod fingerprint;
mod operational;
mod store;
mod zone_ca;

pub use fingerprint::fingerprint;
pub use operational::{CsrBundle, OperationalCert};
pub use store::{FileStore, MemoryStore, Store};
pub use zone_ca::ZoneCaCert;
