// SPDX-License-Identifier: Apache-2.0 OR MIT

//! CBOR wire codec: message types, encode/decode, and cheap message-type
//! peeking.
//!
//! Every on-wire message is a CBOR map with small integer keys (§3.1).
//! Structs are *not* derived directly with `serde` field names — the map
//! shape must stay exactly integer-keyed regardless of Rust field names
//! or `ciborium` version, so encoding goes through explicit
//! `ciborium::value::Value::Map` construction in [`codec`].

mod codec;
mod frame;
mod message;

pub use codec::{decode_notification, decode_request, decode_response, peek_message_type};
pub use frame::FrameCodec;
pub use message::{
    ControlFrame, ControlOpcode, MessageKind, Notification, Operation, Request, Response,
    StatusCode,
};
