// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Controller-side interaction client: message-ID allocation and a
//! pending-requests table awaited by callers (§4.8).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::INTERACTION_CLIENT_TIMEOUT;
use crate::error::{Error, Result};
use crate::wire::{Notification, Response};

struct Pending {
    reply: mpsc::Sender<Response>,
}

/// Allocates message ids (starting at 1, skipping 0 on wraparound) and
/// routes responses back to the caller that sent the matching request.
/// Notifications are routed to a separately-registered callback;
/// responses with no matching pending entry are discarded as orphans
/// (§4.8).
pub struct InteractionClient {
    next_id: AtomicU32,
    pending: Mutex<HashMap<u32, Pending>>,
}

impl Default for InteractionClient {
    fn default() -> Self {
        Self {
            next_id: AtomicU32::new(1),
            pending: Mutex::new(HashMap::new()),
        }
    }
}

impl InteractionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next message id, skipping 0 on wraparound.
    pub fn next_message_id(&self) -> u32 {
        loop {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            if id != 0 {
                return id;
            }
        }
    }

    /// Register a pending request before the encoded frame is sent, so a
    /// response racing the registration is never missed.
    fn register(&self, message_id: u32) -> mpsc::Receiver<Response> {
        let (tx, rx) = mpsc::channel();
        self.pending.lock().insert(message_id, Pending { reply: tx });
        rx
    }

    fn cancel(&self, message_id: u32) {
        self.pending.lock().remove(&message_id);
    }

    /// Dispatch an inbound [`Response`] to its waiter. A response with no
    /// matching entry (late arrival after timeout, or spoofed id) is
    /// silently dropped.
    pub fn dispatch_response(&self, response: Response) {
        let waiter = self.pending.lock().remove(&response.message_id);
        if let Some(waiter) = waiter {
            let _ = waiter.reply.send(response);
        }
    }

    /// Block the calling thread for a response to `message_id`, honoring
    /// `min(ctx_deadline, clientDefault)` (§4.8). The caller is
    /// responsible for having already sent the framed request before
    /// calling this.
    pub fn await_response(&self, message_id: u32, deadline: Option<Duration>) -> Result<Response> {
        let rx = self.register(message_id);
        let timeout = match deadline {
            Some(d) if d < INTERACTION_CLIENT_TIMEOUT => d,
            _ => INTERACTION_CLIENT_TIMEOUT,
        };
        match rx.recv_timeout(timeout) {
            Ok(response) => Ok(response),
            Err(_) => {
                self.cancel(message_id);
                Err(Error::Busy { retry_after_ms: 0 })
            }
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Tear down every pending request with `ConnectionLost`, used on
    /// connection close (§5 "Resource cleanup").
    pub fn fail_all(&self) {
        let entries: Vec<Pending> = self.pending.lock().drain().map(|(_, v)| v).collect();
        for entry in entries {
            let _ = entry.reply.send(Response::error(0, crate::wire::StatusCode::Timeout));
            drop(entry);
        }
    }
}

/// Callback invoked for every routed [`Notification`] (§4.8).
pub trait NotificationSink: Send + Sync {
    fn on_notification(&self, notification: Notification);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::StatusCode;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn message_ids_increment_and_skip_zero() {
        let client = InteractionClient::new();
        assert_eq!(client.next_message_id(), 1);
        assert_eq!(client.next_message_id(), 2);
    }

    #[test]
    fn wraparound_skips_zero() {
        let client = InteractionClient::new();
        client.next_id.store(u32::MAX, Ordering::Relaxed);
        assert_eq!(client.next_message_id(), u32::MAX);
        assert_eq!(client.next_message_id(), 1);
    }

    #[test]
    fn dispatch_routes_to_matching_waiter() {
        let client = Arc::new(InteractionClient::new());
        let id = client.next_message_id();
        let rx = client.register(id);

        let client2 = Arc::clone(&client);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            client2.dispatch_response(Response::success(id, None));
        });

        let response = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(response.status, StatusCode::Success);
    }

    #[test]
    fn orphaned_response_is_discarded_without_panic() {
        let client = InteractionClient::new();
        client.dispatch_response(Response::success(42, None));
        assert_eq!(client.pending_count(), 0);
    }

    #[test]
    fn fail_all_clears_pending_table() {
        let client = InteractionClient::new();
        let _rx = client.register(5);
        assert_eq!(client.pending_count(), 1);
        client.fail_all();
        assert_eq!(client.pending_count(), 0);
    }
}
