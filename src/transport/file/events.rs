//! Side channel for file failures. Writes never return errors to the log call,
//! so the registry broadcasts `(path, error)` to whoever subscribed.

use crate::Error;
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

type Listener = Arc<dyn Fn(&Path, &Error) + Send + Sync>;

#[derive(Default)]
pub struct ErrorEvents {
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_id: AtomicU64,
}

impl ErrorEvents {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` until the returned [`Subscription`] is dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(
        self: &Arc<Self>,
        listener: impl Fn(&Path, &Error) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        Subscription {
            id,
            events: Arc::downgrade(self),
        }
    }

    /// Delivers to a snapshot of the listeners, so a listener may subscribe or
    /// unsubscribe without deadlocking.
    pub fn emit(&self, path: &Path, error: &Error) {
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        if listeners.is_empty() {
            crate::internal::warn("FILE", &format!("Unobserved error: {error}"));
        }

        for listener in listeners {
            listener(path, error);
        }
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl fmt::Debug for ErrorEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorEvents")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Keeps a listener registered; unsubscribes on drop.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    events: Weak<ErrorEvents>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(events) = self.events.upgrade() {
            events
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|(id, _)| *id != self.id);
        }
    }
}
