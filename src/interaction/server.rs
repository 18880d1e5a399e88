// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Device-side protocol handler: dispatches a decoded [`Request`] against
//! the device model and subscription manager (§4.8).

use std::time::{Duration, Instant};

use ciborium::value::Value;

use crate::device_model::{Device, RequestContext};
use crate::error::Error;
use crate::subscription::SubscriptionManager;
use crate::wire::{Operation, Request, Response, StatusCode};

fn text_map_get<'a>(payload: &'a Value, key: &str) -> Option<&'a Value> {
    match payload {
        Value::Map(entries) => entries.iter().find_map(|(k, v)| {
            if k.as_text() == Some(key) {
                Some(v)
            } else {
                None
            }
        }),
        _ => None,
    }
}

fn as_u16_list(value: &Value) -> Option<Vec<u16>> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|v| v.as_integer().and_then(|i| u16::try_from(i).ok()))
            .collect(),
        _ => None,
    }
}

/// Owns one connection's subscriptions and dispatches every incoming
/// [`Request`] to the device model (§4.8).
pub struct ProtocolHandler {
    pub subscriptions: SubscriptionManager,
}

impl Default for ProtocolHandler {
    fn default() -> Self {
        Self {
            subscriptions: SubscriptionManager::new(),
        }
    }
}

impl ProtocolHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, ctx: &RequestContext, device: &mut Device, req: Request) -> Response {
        match req.operation {
            Operation::Read => self.handle_read(ctx, device, &req),
            Operation::Write => self.handle_write(ctx, device, &req),
            Operation::Subscribe => self.handle_subscribe(ctx, device, &req),
            Operation::Invoke => self.handle_invoke(ctx, device, &req),
        }
    }

    fn handle_read(&mut self, ctx: &RequestContext, device: &mut Device, req: &Request) -> Response {
        let Some(endpoint) = device.endpoint(req.endpoint_id) else {
            return Response::error(req.message_id, StatusCode::InvalidEndpoint);
        };
        let Some(feature) = endpoint.features.get(&req.feature_id) else {
            return Response::error(req.message_id, StatusCode::InvalidFeature);
        };

        let attr_ids = req
            .payload
            .as_ref()
            .and_then(|p| text_map_get(p, "attrIds"))
            .and_then(as_u16_list)
            .unwrap_or_else(|| feature.all_attribute_ids());

        let mut out = Vec::new();
        for attr_id in attr_ids {
            match feature.read_attribute(ctx, attr_id) {
                Ok(Some(value)) => out.push((Value::Integer((attr_id as i64).into()), value)),
                Ok(None) => return Response::error(req.message_id, StatusCode::InvalidAttribute),
                Err(_) => return Response::error(req.message_id, StatusCode::InvalidParameter),
            }
        }
        Response::success(req.message_id, Some(Value::Map(out)))
    }

    fn handle_write(&mut self, _ctx: &RequestContext, device: &mut Device, req: &Request) -> Response {
        let Some(endpoint) = device.endpoint_mut(req.endpoint_id) else {
            return Response::error(req.message_id, StatusCode::InvalidEndpoint);
        };
        let Some(feature) = endpoint.features.get_mut(&req.feature_id) else {
            return Response::error(req.message_id, StatusCode::InvalidFeature);
        };

        let Some(Value::Map(entries)) = &req.payload else {
            return Response::error(req.message_id, StatusCode::InvalidParameter);
        };

        let mut writes: Vec<(u16, Value)> = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let Some(attr_id) = key.as_integer().and_then(|i| u16::try_from(i).ok()) else {
                return Response::error(req.message_id, StatusCode::InvalidParameter);
            };
            let Some(attr) = feature.attributes.get(&attr_id) else {
                return Response::error(req.message_id, StatusCode::InvalidAttribute);
            };
            if !attr.access.write {
                return Response::error(req.message_id, StatusCode::ReadOnly);
            }
            if !attr.constraint.check(value) {
                return Response::error(req.message_id, StatusCode::ConstraintError);
            }
            writes.push((attr_id, value.clone()));
        }

        // All validated; apply atomically.
        let mut applied = Vec::with_capacity(writes.len());
        for (attr_id, value) in writes {
            if let Some(attr) = feature.attributes.get(&attr_id) {
                attr.set_value(value.clone());
                applied.push((Value::Integer((attr_id as i64).into()), value));
            }
        }

        Response::success(req.message_id, Some(Value::Map(applied)))
    }

    fn handle_subscribe(&mut self, _ctx: &RequestContext, device: &mut Device, req: &Request) -> Response {
        if req.endpoint_id == 0 && req.feature_id == 0 {
            return self.handle_unsubscribe(req);
        }

        let Some(endpoint) = device.endpoint(req.endpoint_id) else {
            return Response::error(req.message_id, StatusCode::InvalidEndpoint);
        };
        let Some(feature) = endpoint.features.get(&req.feature_id) else {
            return Response::error(req.message_id, StatusCode::InvalidFeature);
        };

        let payload = req.payload.clone().unwrap_or(Value::Null);
        let attr_ids = text_map_get(&payload, "attrIds")
            .and_then(as_u16_list)
            .unwrap_or_else(|| feature.all_attribute_ids());
        let min_interval_ms = text_map_get(&payload, "minIntervalMs")
            .and_then(Value::as_integer)
            .and_then(|i| u64::try_from(i).ok())
            .unwrap_or(1_000);
        let max_interval_ms = text_map_get(&payload, "maxIntervalMs")
            .and_then(Value::as_integer)
            .and_then(|i| u64::try_from(i).ok())
            .unwrap_or(60_000);
        let suppress_bounce_back = text_map_get(&payload, "suppressBounceBack")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let id = self.subscriptions.subscribe(
            "", // zone id filled in by the caller-scoped session wrapper
            req.endpoint_id,
            req.feature_id,
            attr_ids.clone(),
            Duration::from_millis(min_interval_ms),
            Duration::from_millis(max_interval_ms),
            suppress_bounce_back,
        );

        Response::success(
            req.message_id,
            Some(Value::Map(vec![(
                Value::Text("subscriptionId".into()),
                Value::Integer((id as i64).into()),
            )])),
        )
    }

    fn handle_unsubscribe(&mut self, req: &Request) -> Response {
        let Some(payload) = &req.payload else {
            return Response::error(req.message_id, StatusCode::InvalidParameter);
        };
        let Some(id) = text_map_get(payload, "subscriptionId")
            .and_then(Value::as_integer)
            .and_then(|i| u32::try_from(i).ok())
        else {
            return Response::error(req.message_id, StatusCode::InvalidParameter);
        };

        // Unsubscribing an id that isn't (or is no longer) active is not an
        // error: a race between an expiring subscription and a client's
        // unsubscribe, or a duplicate unsubscribe, both resolve to the same
        // end state the caller wanted (§8.2 — unsubscribe is idempotent).
        match self.subscriptions.unsubscribe(id) {
            Ok(()) | Err(Error::NotFound(_)) => Response::success(req.message_id, None),
            Err(_) => Response::error(req.message_id, StatusCode::InvalidParameter),
        }
    }

    fn handle_invoke(&mut self, ctx: &RequestContext, device: &mut Device, req: &Request) -> Response {
        let Some(endpoint) = device.endpoint(req.endpoint_id) else {
            return Response::error(req.message_id, StatusCode::InvalidEndpoint);
        };
        let Some(feature) = endpoint.features.get(&req.feature_id) else {
            return Response::error(req.message_id, StatusCode::InvalidFeature);
        };

        let payload = req.payload.clone().unwrap_or(Value::Null);
        let Some(command_id) = text_map_get(&payload, "commandId")
            .and_then(Value::as_integer)
            .and_then(|i| u8::try_from(i).ok())
        else {
            return Response::error(req.message_id, StatusCode::InvalidParameter);
        };
        let params = text_map_get(&payload, "params").cloned();

        let Some(command) = feature.commands.get(&command_id) else {
            return Response::error(req.message_id, StatusCode::InvalidCommand);
        };

        match command.handler.invoke(ctx, params) {
            Ok(result) => Response::success(req.message_id, Some(result)),
            Err(status) => Response::error(req.message_id, status),
        }
    }

    /// Drive coalescing windows and heartbeats; returns notifications to
    /// send (§4.7).
    pub fn poll_subscriptions(
        &mut self,
        now: Instant,
        current_values: impl Fn(&crate::subscription::Subscription) -> crate::subscription::ValueSnapshot,
    ) -> Vec<crate::subscription::SubscriptionEvent> {
        self.subscriptions.poll(now, current_values)
    }
}
