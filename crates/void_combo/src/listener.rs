//! Combo listeners
//!
//! Any number of listeners can subscribe to rank changes and resets. They
//! run in registration order. A listener that panics is logged and counted,
//! and the remaining listeners still run.

use crate::state::ComboEvent;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Subscriber ID
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub u64);

/// Rank change handler, called with the new rank
pub type ChangeHandler = Arc<dyn Fn(u32) + Send + Sync>;

/// Reset handler, called with the rank the chain was at
pub type ResetHandler = Arc<dyn Fn(u32) + Send + Sync>;

/// Handler for every combo event
pub type EventHandler = Arc<dyn Fn(&ComboEvent) + Send + Sync>;

#[derive(Clone)]
enum Handler {
    Change(ChangeHandler),
    Reset(ResetHandler),
    Any(EventHandler),
}

impl Handler {
    fn name(&self) -> &'static str {
        match self {
            Self::Change(_) => "change",
            Self::Reset(_) => "reset",
            Self::Any(_) => "event",
        }
    }

    fn call(&self, event: &ComboEvent) {
        match (self, event) {
            (Self::Change(handler), ComboEvent::Changed { rank, .. }) => handler(*rank),
            (Self::Reset(handler), ComboEvent::Reset { previous }) => handler(*previous),
            (Self::Any(handler), event) => handler(event),
            _ => {}
        }
    }
}

/// Ordered listener registry
///
/// Cloning is cheap and clones share the failure counter, so a snapshot
/// can be dispatched without holding any lock.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    handlers: Vec<(SubscriberId, Handler)>,
    next_id: u64,
    failures: Arc<AtomicU64>,
}

impl ListenerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&mut self, handler: Handler) -> SubscriberId {
        self.next_id += 1;
        let id = SubscriberId(self.next_id);
        self.handlers.push((id, handler));
        id
    }

    /// Subscribe to rank changes
    pub fn on_change<F>(&mut self, handler: F) -> SubscriberId
    where
        F: Fn(u32) + Send + Sync + 'static,
    {
        self.add(Handler::Change(Arc::new(handler)))
    }

    /// Subscribe to resets
    pub fn on_reset<F>(&mut self, handler: F) -> SubscriberId
    where
        F: Fn(u32) + Send + Sync + 'static,
    {
        self.add(Handler::Reset(Arc::new(handler)))
    }

    /// Subscribe to every event
    pub fn on_event<F>(&mut self, handler: F) -> SubscriberId
    where
        F: Fn(&ComboEvent) + Send + Sync + 'static,
    {
        self.add(Handler::Any(Arc::new(handler)))
    }

    /// Unsubscribe, returns false if the ID was not registered
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(sub_id, _)| *sub_id != id);
        self.handlers.len() != before
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if there are no listeners
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Total listener panics caught so far
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Deliver events in order to every matching listener
    ///
    /// Returns the number of listener failures in this dispatch.
    pub fn dispatch(&self, events: &[ComboEvent]) -> usize {
        let mut failed = 0;

        for event in events {
            for (id, handler) in &self.handlers {
                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| handler.call(event))) {
                    let message = if let Some(s) = payload.downcast_ref::<&str>() {
                        s.to_string()
                    } else if let Some(s) = payload.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    log::error!(
                        "Combo {} listener {} failed on {:?}: {}",
                        handler.name(),
                        id.0,
                        event,
                        message
                    );
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            self.failures.fetch_add(failed as u64, Ordering::Relaxed);
        }
        failed
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.handlers.len())
            .field("failures", &self.failures())
            .finish()
    }
}
