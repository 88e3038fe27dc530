//! Cart: event bus, state manager and sync adapter

pub mod bus;
pub mod manager;
pub mod sync;

pub use bus::{CartEventBus, Subscription};
pub use manager::{CartManager, CartState};
pub use sync::CartSync;

use std::time::Duration;

/// Cart manager throttling and timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartConfig {
    /// Calls to `load_cart` within this window collapse into one
    pub batch_delay: Duration,
    /// Minimum spacing between cart fetches while the cache is fresh
    pub min_fetch_interval: Duration,
    /// Deadline for `add_item`
    pub add_item_timeout: Duration,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            batch_delay: Duration::from_millis(100),
            min_fetch_interval: Duration::from_secs(1),
            add_item_timeout: Duration::from_secs(10),
        }
    }
}

/// Sync adapter debounce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Trailing debounce after the last change
    pub debounce: Duration,
    /// Minimum spacing between version bumps
    pub min_interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(50),
            min_interval: Duration::from_millis(100),
        }
    }
}
