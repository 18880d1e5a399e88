// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Commissioning engine: message-gated locking, connection hardening, and
//! the commissioning message set (§4.5).

mod governor;
mod lock;
mod messages;
mod renewal;

pub use governor::ConnectionGovernor;
pub use lock::MessageGatedLock;
pub use messages::{CommissioningErrorCode, MsgType};
pub use renewal::{RenewalSession, RenewalState};
