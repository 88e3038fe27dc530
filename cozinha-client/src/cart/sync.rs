//! Cart sync adapter
//!
//! Background task that turns bursts of cart activity into a single
//! version bump. Views watch the version and re-read the cart when it
//! moves. It reacts to `AppEvent::CartUpdated` and to cart-state changes
//! that alter the item count or the loading flag.

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::debounce::{DebounceConfig, Debouncer};
use crate::events::AppEvent;

use super::SyncConfig;
use super::manager::CartState;

/// Idle wake-up when nothing is pending
const IDLE_SLEEP: Duration = Duration::from_secs(3600);

#[derive(Debug)]
pub struct CartSync {
    version: watch::Receiver<u64>,
    shutdown: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl CartSync {
    /// Spawns the adapter on the current tokio runtime
    pub fn spawn(
        events: broadcast::Receiver<AppEvent>,
        state: watch::Receiver<CartState>,
        config: SyncConfig,
    ) -> Self {
        let (version_tx, version) = watch::channel(0u64);
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(run(events, state, config, version_tx, shutdown.clone()));
        Self {
            version,
            shutdown,
            handle: Some(handle),
        }
    }

    /// Current version
    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    /// Receiver notified on every bump
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.clone()
    }

    /// Stops the task and waits for it to finish
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            tracing::warn!("Cart sync task ended abnormally: {}", e);
        }
    }
}

impl Drop for CartSync {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn run(
    mut events: broadcast::Receiver<AppEvent>,
    mut state: watch::Receiver<CartState>,
    config: SyncConfig,
    version: watch::Sender<u64>,
    shutdown: CancellationToken,
) {
    let gate = Debouncer::new(DebounceConfig::new(config.debounce, config.min_interval));
    let mut deadline: Option<Instant> = None;
    let mut last_seen = snapshot(&state.borrow_and_update());
    let mut state_open = true;

    loop {
        let sleep_until = deadline.unwrap_or_else(|| Instant::now() + IDLE_SLEEP);

        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::debug!("cart sync stopped");
                break;
            }

            _ = tokio::time::sleep_until(sleep_until), if deadline.is_some() => {
                let wait = gate.remaining();
                if wait.is_zero() {
                    gate.mark_fired();
                    version.send_modify(|v| *v += 1);
                    deadline = None;
                } else {
                    deadline = Some(Instant::now() + wait);
                }
            }

            result = events.recv() => {
                match result {
                    Ok(AppEvent::CartUpdated) => {
                        deadline = Some(Instant::now() + config.debounce);
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::debug!("cart sync lagged {} events", n);
                        deadline = Some(Instant::now() + config.debounce);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::debug!("app event channel closed, cart sync stopping");
                        break;
                    }
                }
            }

            changed = state.changed(), if state_open => {
                if changed.is_err() {
                    state_open = false;
                    continue;
                }
                let current = snapshot(&state.borrow_and_update());
                if current != last_seen {
                    last_seen = current;
                    deadline = Some(Instant::now() + config.debounce);
                }
            }
        }
    }
}

fn snapshot(state: &CartState) -> (u32, bool) {
    (state.total_items(), state.loading)
}
