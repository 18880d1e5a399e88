// SPDX-License-Identifier: Apache-2.0 OR MIT

//! SPAKE2+ PASE: verifier derivation, handshake state machine, and the
//! per-peer attempt backoff tracker (§3.6, §4.5).

mod backoff;
mod handshake;
mod verifier;

pub use backoff::AttemptTracker;
pub use handshake::{ServerHandshake, SharedSecret};
pub use verifier::{Verifier, SETUP_CODE_DIGITS};
