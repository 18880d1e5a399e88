// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wire message types (§3.1).

use ciborium::value::Value;

/// Operation carried in a [`Request`]'s key `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read = 1,
    Write = 2,
    /// `Subscribe`, or `Unsubscribe` when `endpointId == 0 && featureId == 0`.
    Subscribe = 3,
    Invoke = 4,
}

impl Operation {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(Operation::Read),
            2 => Some(Operation::Write),
            3 => Some(Operation::Subscribe),
            4 => Some(Operation::Invoke),
            _ => None,
        }
    }
}

/// Response status codes (§3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Success = 0,
    InvalidEndpoint = 1,
    InvalidFeature = 2,
    InvalidAttribute = 3,
    InvalidCommand = 4,
    InvalidParameter = 5,
    ReadOnly = 6,
    WriteOnly = 7,
    NotAuthorized = 8,
    Busy = 9,
    Unsupported = 10,
    ConstraintError = 11,
    Timeout = 12,
    ResourceExhausted = 13,
}

impl StatusCode {
    pub fn from_u8(v: u8) -> Option<Self> {
        use StatusCode::*;
        Some(match v {
            0 => Success,
            1 => InvalidEndpoint,
            2 => InvalidFeature,
            3 => InvalidAttribute,
            4 => InvalidCommand,
            5 => InvalidParameter,
            6 => ReadOnly,
            7 => WriteOnly,
            8 => NotAuthorized,
            9 => Busy,
            10 => Unsupported,
            11 => ConstraintError,
            12 => Timeout,
            13 => ResourceExhausted,
            _ => return None,
        })
    }
}

/// A request from the interaction client to the protocol handler.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Non-zero, unique per connection direction.
    pub message_id: u32,
    pub operation: Operation,
    pub endpoint_id: u8,
    pub feature_id: u8,
    pub payload: Option<Value>,
}

/// A response to a [`Request`] with the same `message_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub message_id: u32,
    pub status: StatusCode,
    pub payload: Option<Value>,
}

impl Response {
    pub fn success(message_id: u32, payload: Option<Value>) -> Self {
        Self {
            message_id,
            status: StatusCode::Success,
            payload,
        }
    }

    pub fn error(message_id: u32, status: StatusCode) -> Self {
        Self {
            message_id,
            status,
            payload: None,
        }
    }
}

/// An unsolicited subscription update. `message_id` is always 0 on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub subscription_id: u32,
    pub endpoint_id: u8,
    pub feature_id: u8,
    pub changes: Value,
}

/// Transport-level control opcode — not part of the CBOR wire messages,
/// carried as a single unframed byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOpcode {
    Ping = 1,
    Pong = 2,
    Close = 3,
}

impl ControlOpcode {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(ControlOpcode::Ping),
            2 => Some(ControlOpcode::Pong),
            3 => Some(ControlOpcode::Close),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlFrame(pub ControlOpcode);

/// The shape [`peek_message_type`] detects without a full decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Request,
    Response,
    Notification,
}
