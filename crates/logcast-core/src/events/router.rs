//! Name → handler routing for inbound events.
//!
//! The router is the subscription half of a connection. Handlers are kept
//! in registration order and invoked synchronously on the dispatching task,
//! so events reach handlers in the order they were dispatched.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use serde_json::Value;
use tracing::trace;

use super::Envelope;

/// Callback invoked with an event's payload.
pub type Handler = Arc<dyn Fn(&Value) + Send + Sync>;

/// Anything that lets callers subscribe to named events.
pub trait EventSource {
    /// Register `handler` for every event named `event`.
    ///
    /// Registrations are not deduplicated: subscribing the same handler twice
    /// means it runs twice per event.
    fn on(&self, event: &str, handler: Handler) -> Subscription;
}

struct Registration {
    id: u64,
    event: String,
    handler: Handler,
}

#[derive(Default)]
struct RouterInner {
    next_id: AtomicU64,
    registrations: Mutex<Vec<Registration>>,
}

impl RouterInner {
    fn remove(&self, id: u64) {
        let mut registrations = self
            .registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        registrations.retain(|r| r.id != id);
    }
}

/// Shared handler registry.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone, Default)]
pub struct EventRouter {
    inner: Arc<RouterInner>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoke every handler registered for `event`.
    ///
    /// Returns the number of handlers that ran. Handlers are snapshotted
    /// before invocation, so a handler may subscribe or unsubscribe without
    /// deadlocking; such changes apply from the next dispatch.
    pub fn dispatch(&self, event: &str, payload: &Value) -> usize {
        let handlers: Vec<Handler> = {
            let registrations = self
                .inner
                .registrations
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            registrations
                .iter()
                .filter(|r| r.event == event)
                .map(|r| Arc::clone(&r.handler))
                .collect()
        };

        trace!(event, handlers = handlers.len(), "dispatching event");
        for handler in &handlers {
            handler(payload);
        }
        handlers.len()
    }

    /// Dispatch a decoded envelope.
    pub fn dispatch_envelope(&self, envelope: &Envelope) -> usize {
        self.dispatch(&envelope.event, &envelope.data)
    }

    /// Number of live registrations for `event`.
    pub fn handler_count(&self, event: &str) -> usize {
        self.inner
            .registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.event == event)
            .count()
    }
}

impl EventSource for EventRouter {
    fn on(&self, event: &str, handler: Handler) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Registration {
                id,
                event: event.to_string(),
                handler,
            });

        Subscription {
            id,
            event: event.to_string(),
            router: Arc::downgrade(&self.inner),
        }
    }
}

impl std::fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self
            .inner
            .registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("EventRouter")
            .field("registrations", &count)
            .finish()
    }
}

/// Guard for a handler registration.
///
/// Dropping the guard unsubscribes the handler. Call [`Subscription::detach`]
/// to keep the handler registered for the lifetime of the router instead.
#[must_use = "dropping a Subscription unsubscribes its handler"]
pub struct Subscription {
    id: u64,
    event: String,
    router: Weak<RouterInner>,
}

impl Subscription {
    /// Name of the event this subscription listens to.
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Remove the handler now.
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Keep the handler registered for as long as the router lives.
    pub fn detach(mut self) {
        self.router = Weak::new();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(router) = self.router.upgrade() {
            router.remove(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("event", &self.event)
            .finish()
    }
}
