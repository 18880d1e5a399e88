// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Encode/decode between [`super::message`] types and CBOR bytes.
//!
//! Messages are built as `ciborium::value::Value::Map` with small-integer
//! keys directly, rather than via `#[derive(Serialize)]` on the message
//! structs, so the wire shape in §3.1 is exact and does not drift with
//! field renames or `ciborium`'s struct-encoding conventions.

use ciborium::value::Value;

use super::message::{MessageKind, Notification, Operation, Request, Response, StatusCode};
use crate::error::{Error, Result};

fn key(n: i64) -> Value {
    Value::Integer(n.into())
}

fn as_map(v: &Value) -> Result<&Vec<(Value, Value)>> {
    match v {
        Value::Map(m) => Ok(m),
        _ => Err(Error::InvalidParameter("expected CBOR map".into())),
    }
}

fn get<'a>(map: &'a [(Value, Value)], k: i64) -> Option<&'a Value> {
    map.iter()
        .find(|(mk, _)| matches!(mk, Value::Integer(i) if i64::try_from(*i).ok() == Some(k)))
        .map(|(_, v)| v)
}

/// Coerce a decoded CBOR integer into a `u32`, tolerating the post-decode
/// `map<any,any>` shape (§4.2).
pub fn as_u32(v: &Value) -> Result<u32> {
    match v {
        Value::Integer(i) => u32::try_from(*i)
            .map_err(|_| Error::InvalidParameter("integer out of u32 range".into())),
        _ => Err(Error::InvalidParameter("expected integer".into())),
    }
}

/// Coerce a decoded CBOR integer into a `u8`.
pub fn as_u8(v: &Value) -> Result<u8> {
    match v {
        Value::Integer(i) => {
            u8::try_from(*i).map_err(|_| Error::InvalidParameter("integer out of u8 range".into()))
        }
        _ => Err(Error::InvalidParameter("expected integer".into())),
    }
}

fn encode_value(v: &Value) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(v, &mut buf).map_err(|e| Error::InvalidParameter(e.to_string()))?;
    Ok(buf)
}

fn decode_value(bytes: &[u8]) -> Result<Value> {
    ciborium::from_reader(bytes).map_err(|e| Error::InvalidParameter(e.to_string()))
}

/// Encode a [`Request`].
pub fn encode_request(msg: &Request) -> Result<Vec<u8>> {
    let mut fields = vec![
        (key(1), key(i64::from(msg.message_id))),
        (key(2), key(msg.operation as i64)),
        (key(3), key(i64::from(msg.endpoint_id))),
        (key(4), key(i64::from(msg.feature_id))),
    ];
    if let Some(p) = &msg.payload {
        fields.push((key(5), p.clone()));
    }
    encode_value(&Value::Map(fields))
}

/// Decode a [`Request`].
pub fn decode_request(bytes: &[u8]) -> Result<Request> {
    let value = decode_value(bytes)?;
    let map = as_map(&value)?;
    let message_id = as_u32(get(map, 1).ok_or_else(|| missing(1))?)?;
    let op_raw = as_u8(get(map, 2).ok_or_else(|| missing(2))?)?;
    let operation = Operation::from_u8(op_raw)
        .ok_or_else(|| Error::InvalidParameter(format!("unknown operation {op_raw}")))?;
    let endpoint_id = as_u8(get(map, 3).ok_or_else(|| missing(3))?)?;
    let feature_id = as_u8(get(map, 4).ok_or_else(|| missing(4))?)?;
    let payload = get(map, 5).cloned();
    if message_id == 0 {
        return Err(Error::InvalidParameter(
            "request message id must be non-zero".into(),
        ));
    }
    Ok(Request {
        message_id,
        operation,
        endpoint_id,
        feature_id,
        payload,
    })
}

/// Encode a [`Response`].
pub fn encode_response(msg: &Response) -> Result<Vec<u8>> {
    let mut fields = vec![
        (key(1), key(i64::from(msg.message_id))),
        (key(2), key(msg.status as i64)),
    ];
    if let Some(p) = &msg.payload {
        fields.push((key(3), p.clone()));
    }
    encode_value(&Value::Map(fields))
}

/// Decode a [`Response`].
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let value = decode_value(bytes)?;
    let map = as_map(&value)?;
    let message_id = as_u32(get(map, 1).ok_or_else(|| missing(1))?)?;
    let status_raw = as_u8(get(map, 2).ok_or_else(|| missing(2))?)?;
    let status = StatusCode::from_u8(status_raw)
        .ok_or_else(|| Error::InvalidParameter(format!("unknown status {status_raw}")))?;
    let payload = get(map, 3).cloned();
    Ok(Response {
        message_id,
        status,
        payload,
    })
}

/// Encode a [`Notification`]. `message_id` (key 1) is always `0`.
pub fn encode_notification(msg: &Notification) -> Result<Vec<u8>> {
    let fields = vec![
        (key(1), key(0)),
        (key(2), key(i64::from(msg.subscription_id))),
        (key(3), key(i64::from(msg.endpoint_id))),
        (key(4), key(i64::from(msg.feature_id))),
        (key(5), msg.changes.clone()),
    ];
    encode_value(&Value::Map(fields))
}

/// Decode a [`Notification`].
pub fn decode_notification(bytes: &[u8]) -> Result<Notification> {
    let value = decode_value(bytes)?;
    let map = as_map(&value)?;
    let message_id = as_u32(get(map, 1).ok_or_else(|| missing(1))?)?;
    if message_id != 0 {
        return Err(Error::InvalidParameter(
            "notification message id must be 0".into(),
        ));
    }
    let subscription_id = as_u32(get(map, 2).ok_or_else(|| missing(2))?)?;
    let endpoint_id = as_u8(get(map, 3).ok_or_else(|| missing(3))?)?;
    let feature_id = as_u8(get(map, 4).ok_or_else(|| missing(4))?)?;
    let changes = get(map, 5).cloned().unwrap_or(Value::Null);
    Ok(Notification {
        subscription_id,
        endpoint_id,
        feature_id,
        changes,
    })
}

/// Inspect a decoded CBOR map's key `1` to classify the message without a
/// full typed decode (§4.2): `1 == 0` means [`MessageKind::Notification`],
/// presence of key `4` alongside a non-zero key `1` with key `2`/`3` present
/// means [`MessageKind::Request`] (it carries `operation`/`endpointId`),
/// otherwise [`MessageKind::Response`].
pub fn peek_message_type(bytes: &[u8]) -> Result<MessageKind> {
    let value = decode_value(bytes)?;
    let map = as_map(&value)?;
    let message_id = get(map, 1).ok_or_else(|| missing(1))?;
    let id = as_u32(message_id)?;
    if id == 0 {
        return Ok(MessageKind::Notification);
    }
    // Requests carry operation (key 2), endpointId (key 3) and featureId
    // (key 4); responses carry only status (key 2) and an optional payload
    // (key 3). Presence of key 4 disambiguates.
    if get(map, 4).is_some() {
        Ok(MessageKind::Request)
    } else {
        Ok(MessageKind::Response)
    }
}

fn missing(k: i64) -> Error {
    Error::InvalidParameter(format!("missing key {k}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_round_trips() {
        let req = Request {
            message_id: 7,
            operation: Operation::Read,
            endpoint_id: 1,
            feature_id: 2,
            payload: Some(Value::Array(vec![key(10), key(11)])),
        };
        let bytes = encode_request(&req).unwrap();
        let decoded = decode_request(&bytes).unwrap();
        assert_eq!(req, decoded);
    }

    #[test]
    fn response_round_trips() {
        let resp = Response::success(7, Some(Value::Text("ok".into())));
        let bytes = encode_response(&resp).unwrap();
        let decoded = decode_response(&bytes).unwrap();
        assert_eq!(resp, decoded);
    }

    #[test]
    fn notification_round_trips() {
        let note = Notification {
            subscription_id: 3,
            endpoint_id: 1,
            feature_id: 9,
            changes: Value::Map(vec![(key(1), key(42))]),
        };
        let bytes = encode_notification(&note).unwrap();
        let decoded = decode_notification(&bytes).unwrap();
        assert_eq!(note, decoded);
    }

    #[test]
    fn request_rejects_zero_message_id() {
        let fields = vec![
            (key(1), key(0)),
            (key(2), key(1)),
            (key(3), key(0)),
            (key(4), key(0)),
        ];
        let bytes = encode_value(&Value::Map(fields)).unwrap();
        assert!(decode_request(&bytes).is_err());
    }

    #[test]
    fn peek_classifies_each_kind() {
        let req = Request {
            message_id: 1,
            operation: Operation::Read,
            endpoint_id: 0,
            feature_id: 0,
            payload: None,
        };
        let resp = Response::success(1, None);
        let note = Notification {
            subscription_id: 1,
            endpoint_id: 0,
            feature_id: 0,
            changes: Value::Null,
        };

        assert_eq!(
            peek_message_type(&encode_request(&req).unwrap()).unwrap(),
            MessageKind::Request
        );
        assert_eq!(
            peek_message_type(&encode_response(&resp).unwrap()).unwrap(),
            MessageKind::Response
        );
        assert_eq!(
            peek_message_type(&encode_notification(&note).unwrap()).unwrap(),
            MessageKind::Notification
        );
    }

    #[test]
    fn coercion_failure_yields_invalid_parameter() {
        let fields = vec![(key(1), Value::Text("not a number".into()))];
        let bytes = encode_value(&Value::Map(fields)).unwrap();
        assert!(matches!(
            peek_message_type(&bytes),
            Err(Error::InvalidParameter(_))
        ));
    }
}
