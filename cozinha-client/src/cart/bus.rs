//! Cart event bus
//!
//! Fans out "cart changed" to two kinds of listeners: callbacks registered
//! with [`CartEventBus::subscribe`] and receivers of the app-event channel
//! ([`CartEventBus::listen`]). One `notify()` reaches each of them exactly
//! once. Order among callbacks is unspecified.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::broadcast;

use crate::events::{AppEvent, AppEvents};

type Callback = Arc<dyn Fn() + Send + Sync>;

struct BusInner {
    subscribers: Mutex<BTreeMap<u64, Callback>>,
    next_id: AtomicU64,
    notifications: AtomicU64,
    events: AppEvents,
}

impl BusInner {
    fn unsubscribe(&self, id: u64) {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }
}

/// Cloneable handle; clones share subscribers and counters
#[derive(Clone)]
pub struct CartEventBus {
    inner: Arc<BusInner>,
}

impl fmt::Debug for CartEventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartEventBus")
            .field("subscribers", &self.subscriber_count())
            .field("notifications", &self.notification_count())
            .finish()
    }
}

impl CartEventBus {
    pub fn new(events: AppEvents) -> Self {
        Self {
            inner: Arc::new(BusInner {
                subscribers: Mutex::new(BTreeMap::new()),
                next_id: AtomicU64::new(1),
                notifications: AtomicU64::new(0),
                events,
            }),
        }
    }

    /// Registers a callback. It stays registered until the returned guard is dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(callback));
        Subscription {
            id,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Receiver on the app-event channel; sees `AppEvent::CartUpdated` once per notify
    pub fn listen(&self) -> broadcast::Receiver<AppEvent> {
        self.inner.events.subscribe()
    }

    /// Invokes every callback, then emits `CartUpdated`. Returns the number
    /// of callbacks invoked.
    pub fn notify(&self) -> usize {
        // Snapshot so callbacks may subscribe/unsubscribe without deadlocking
        let callbacks: Vec<Callback> = self
            .inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        for callback in &callbacks {
            callback();
        }
        self.inner.notifications.fetch_add(1, Ordering::SeqCst);
        self.inner.events.emit(AppEvent::CartUpdated);
        tracing::debug!(subscribers = callbacks.len(), "cart change notified");
        callbacks.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Total number of `notify()` calls so far
    pub fn notification_count(&self) -> u64 {
        self.inner.notifications.load(Ordering::SeqCst)
    }

    pub fn events(&self) -> &AppEvents {
        &self.inner.events
    }
}

/// Subscription guard; unsubscribes on drop
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    bus: Weak<BusInner>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.unsubscribe(self.id);
        }
    }
}
