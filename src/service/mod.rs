// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Device and controller orchestration: session lifecycle, failsafe
//! timers, event stream, and the top-level service state machines
//! (§4.10).
//!
//! The actual socket I/O loop (accept, non-blocking read/write via
//! `mio::Poll`, one dedicated thread) follows the same shape as a
//! conventional poll-based TCP transport: a listener registered for
//! readable events, per-connection read/write buffers driven by
//! [`crate::wire::FrameCodec`], and a command channel from the owning
//! thread. That loop is wiring around the orchestration types below,
//! which hold the actual session/failsafe/event-stream state and are
//! exercised directly in tests.

mod controller;
mod device;
mod events;
mod failsafe;
mod lifecycle;
mod persistence;
mod session;

pub use controller::{ControllerService, PairingRequest};
pub use device::DeviceService;
pub use events::{Event, EventBus};
pub use failsafe::FailsafeTimer;
pub use lifecycle::ServiceState;
pub use persistence::{
    ControllerPersistedState, DevicePersistedState, DeviceRecord, FailsafeRecord, ZoneRecord,
};
pub use session::ZoneSession;
