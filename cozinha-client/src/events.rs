//! Application events
//!
//! Signals the library raises for whatever view layer sits on top: open the
//! login prompt, close it after a successful login, re-read the cart.
//! Delivered over a `tokio::sync::broadcast` channel; every live receiver
//! sees every event sent after it subscribed.

use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppEvent {
    /// A protected action needs a logged-in user
    OpenAuthModal,
    /// Login completed
    LoginSuccess,
    /// The cart changed on the server
    CartUpdated,
}

impl AppEvent {
    /// Event name as used by the web front end
    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAuthModal => "openAuthModal",
            Self::LoginSuccess => "loginSuccess",
            Self::CartUpdated => "cartUpdated",
        }
    }
}

/// Cloneable handle to the app-event channel
#[derive(Debug, Clone)]
pub struct AppEvents {
    sender: broadcast::Sender<AppEvent>,
}

impl Default for AppEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl AppEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Sends an event; returns how many receivers got it
    pub fn emit(&self, event: AppEvent) -> usize {
        tracing::debug!(event = event.name(), "app event");
        // No receivers is fine: nobody is listening yet
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
