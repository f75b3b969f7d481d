//! Listener registry and synchronous event fan-out

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, warn};

/// Lifecycle event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Created,
    Updated,
    Deleted,
    Cleared,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Created => "CREATED",
            EventKind::Updated => "UPDATED",
            EventKind::Deleted => "DELETED",
            EventKind::Cleared => "CLEARED",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single notification: what happened, a human-readable message, and the
/// affected item ID (`SYSTEM` for store-wide events)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub kind: EventKind,
    pub message: String,
    pub id: String,
}

/// Receiver of lifecycle events.
///
/// Implementations must return promptly: delivery is synchronous and the
/// notifying call waits for every listener.
pub trait Listener: Send + Sync {
    fn on_event(&self, event: &Event) -> Result<()>;
}

impl<F> Listener for F
where
    F: Fn(&Event) -> Result<()> + Send + Sync,
{
    fn on_event(&self, event: &Event) -> Result<()> {
        self(event)
    }
}

fn same_listener(a: &Arc<dyn Listener>, b: &Arc<dyn Listener>) -> bool {
    // compare data pointers only; vtable addresses are not stable
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// Registry of listeners with isolated, in-order delivery
#[derive(Default)]
pub struct Notifier {
    listeners: RwLock<Vec<Arc<dyn Listener>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener. Registering the same instance twice is a no-op.
    ///
    /// Returns true if the listener was added.
    pub fn add_listener(&self, listener: Arc<dyn Listener>) -> bool {
        let mut listeners = self.listeners.write();
        if listeners.iter().any(|l| same_listener(l, &listener)) {
            return false;
        }
        listeners.push(listener);
        true
    }

    /// Unregisters a listener instance. Returns true if it was registered.
    pub fn remove_listener(&self, listener: &Arc<dyn Listener>) -> bool {
        let mut listeners = self.listeners.write();
        let len_before = listeners.len();
        listeners.retain(|l| !same_listener(l, listener));
        listeners.len() != len_before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Delivers an event to every registered listener in registration order.
    ///
    /// A listener that errors or panics is logged and skipped; the rest still
    /// receive the event. Returns the number of listeners that accepted it.
    pub fn notify(
        &self,
        kind: EventKind,
        message: impl Into<String>,
        id: impl Into<String>,
    ) -> usize {
        let event = Event {
            kind,
            message: message.into(),
            id: id.into(),
        };

        // Snapshot so listeners may (un)register without deadlocking
        let listeners: Vec<_> = self.listeners.read().clone();
        debug!(kind = %event.kind, id = %event.id, listeners = listeners.len(), "notifying");

        let mut delivered = 0;
        for (index, listener) in listeners.iter().enumerate() {
            match panic::catch_unwind(AssertUnwindSafe(|| listener.on_event(&event))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => {
                    warn!(
                        listener = index,
                        kind = %event.kind,
                        error = %format!("{:#}", e),
                        "listener failed"
                    );
                }
                Err(_) => {
                    warn!(listener = index, kind = %event.kind, "listener panicked");
                }
            }
        }
        delivered
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
