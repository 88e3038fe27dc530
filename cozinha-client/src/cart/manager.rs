//! Cart state manager
//!
//! Keeps a read-through cache of the server-side cart. Mutations never edit
//! the cache directly: they call the backend and then notify the event bus,
//! which marks the cache stale so the next `load_cart` fetches the
//! authoritative cart. The only exception is `clear_cart`, whose outcome is
//! known without asking.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rust_decimal::Decimal;
use serde::de::IgnoredAny;
use shared::models::{CartLineInput, CartQuantityUpdate};
use shared::Cart;
use tokio::sync::watch;

use crate::auth::AuthManager;
use crate::client::HttpClient;
use crate::debounce::{DebounceConfig, Debouncer};
use crate::events::AppEvent;
use crate::{ClientError, ClientResult};

use super::CartConfig;
use super::bus::{CartEventBus, Subscription};

const CART_PATH: &str = "/api/carrinho";
const CART_ITEMS_PATH: &str = "/api/carrinho/itens";

/// Observable cart state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartState {
    pub cart: Cart,
    pub loading: bool,
    /// Humanized message of the last failed operation
    pub error: Option<String>,
}

impl CartState {
    pub fn total_items(&self) -> u32 {
        self.cart.total_items()
    }

    pub fn total_price(&self) -> Decimal {
        self.cart.total_price()
    }
}

pub struct CartManager<C> {
    http: C,
    auth: Arc<AuthManager<C>>,
    bus: CartEventBus,
    config: CartConfig,
    throttle: Arc<Debouncer>,
    stale: Arc<AtomicBool>,
    state: Arc<watch::Sender<CartState>>,
    _invalidate: Subscription,
}

impl<C> std::fmt::Debug for CartManager<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartManager")
            .field("config", &self.config)
            .field("stale", &self.stale.load(Ordering::SeqCst))
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl<C: HttpClient> CartManager<C> {
    /// Registers with `auth` so the cached cart is dropped whenever the
    /// session is cleared, whoever clears it.
    pub fn new(http: C, auth: Arc<AuthManager<C>>, bus: CartEventBus, config: CartConfig) -> Self {
        let stale = Arc::new(AtomicBool::new(true));
        let flag = stale.clone();
        let invalidate = bus.subscribe(move || flag.store(true, Ordering::SeqCst));
        let state = Arc::new(watch::channel(CartState::default()).0);
        let throttle = Arc::new(Debouncer::new(DebounceConfig::new(
            config.batch_delay,
            config.min_fetch_interval,
        )));

        let (weak_stale, weak_throttle, weak_state) = (
            Arc::downgrade(&stale),
            Arc::downgrade(&throttle),
            Arc::downgrade(&state),
        );
        auth.on_session_cleared(move || {
            if let (Some(stale), Some(throttle), Some(state)) = (
                weak_stale.upgrade(),
                weak_throttle.upgrade(),
                weak_state.upgrade(),
            ) {
                reset_cache(&stale, &throttle, &state);
                tracing::debug!("cart cache dropped with the session");
            }
        });

        Self {
            http,
            auth,
            bus,
            throttle,
            config,
            stale,
            state,
            _invalidate: invalidate,
        }
    }

    pub fn state(&self) -> CartState {
        self.state.borrow().clone()
    }

    pub fn cart(&self) -> Cart {
        self.state.borrow().cart.clone()
    }

    /// Receiver that observes every state change
    pub fn watch(&self) -> watch::Receiver<CartState> {
        self.state.subscribe()
    }

    pub fn bus(&self) -> &CartEventBus {
        &self.bus
    }

    /// Whether the next `load_cart` will go to the network
    pub fn is_stale(&self) -> bool {
        self.stale.load(Ordering::SeqCst)
    }

    /// Loads the cart, throttled.
    ///
    /// Waits the batching delay first; a call superseded by a later one
    /// returns the cached cart. A fresh cache is served from memory for
    /// `min_fetch_interval` after the last fetch. Logged out, no request is
    /// made and the local state is cleared.
    pub async fn load_cart(&self) -> ClientResult<Cart> {
        if !self.auth.is_authenticated().await {
            self.reset_local();
            return Ok(Cart::empty());
        }

        if !self.throttle.settle().await {
            tracing::debug!("load_cart superseded by a later call");
            return Ok(self.cart());
        }

        if self.stale.load(Ordering::SeqCst) {
            self.throttle.mark_fired();
        } else if !self.throttle.try_fire() {
            tracing::debug!("load_cart served from cache");
            return Ok(self.cart());
        }
        self.stale.store(false, Ordering::SeqCst);

        self.state.send_modify(|s| s.loading = true);
        match self.fetch_cart().await {
            Ok(cart) => {
                self.state.send_modify(|s| {
                    s.cart = cart.clone();
                    s.loading = false;
                    s.error = None;
                });
                tracing::debug!(items = cart.total_items(), "cart loaded");
                Ok(cart)
            }
            Err(e) => {
                self.stale.store(true, Ordering::SeqCst);
                tracing::warn!("Failed to load cart: {}", e);
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.error = Some(e.humanize());
                });
                Err(e)
            }
        }
    }

    /// Fetches the current server cart without touching the cache.
    /// A user without a cart yet gets an empty one.
    pub async fn fetch_cart(&self) -> ClientResult<Cart> {
        match self
            .auth
            .authorized(|| self.http.get::<Cart>(CART_PATH))
            .await
        {
            Err(ClientError::NotFound(_)) => Ok(Cart::empty()),
            other => other,
        }
    }

    /// Adds a line to the cart.
    ///
    /// Logged out, this asks the view layer to open the login prompt
    /// (`AppEvent::OpenAuthModal`) and returns `NotAuthenticated` without
    /// calling the backend.
    pub async fn add_item(&self, line: &CartLineInput) -> ClientResult<()> {
        if !self.auth.is_authenticated().await {
            self.bus.events().emit(AppEvent::OpenAuthModal);
            return Err(ClientError::NotAuthenticated);
        }
        if line.quantity == 0 {
            return self.record(Err(ClientError::Validation(
                "A quantidade deve ser maior que zero".into(),
            )));
        }

        let timeout = self.config.add_item_timeout;
        let call = self
            .auth
            .authorized(|| self.http.post::<IgnoredAny, _>(CART_ITEMS_PATH, line));
        let result = match tokio::time::timeout(timeout, call).await {
            Ok(result) => result.map(|_| ()),
            Err(_) => Err(ClientError::Timeout(timeout)),
        };

        self.record(result)?;
        tracing::info!(dish_id = line.dish_id, quantity = line.quantity, "item added to cart");
        self.bus.notify();
        Ok(())
    }

    /// Removes the line holding `dish_id`
    pub async fn remove_item(&self, dish_id: i64) -> ClientResult<()> {
        let result = self.remove_line(dish_id).await;
        self.record(result)?;
        self.bus.notify();
        Ok(())
    }

    /// Sets the quantity of the line holding `dish_id`; 0 removes the line
    pub async fn update_quantity(&self, dish_id: i64, quantity: u32) -> ClientResult<()> {
        if quantity == 0 {
            return self.remove_item(dish_id).await;
        }
        let result = self.update_line(dish_id, quantity).await;
        self.record(result)?;
        self.bus.notify();
        Ok(())
    }

    /// Empties the server cart
    pub async fn clear_cart(&self) -> ClientResult<()> {
        let result = self.clear_remote().await;
        self.record(result)?;
        self.state.send_modify(|s| s.cart = Cart::empty());
        tracing::info!("cart cleared");
        self.bus.notify();
        Ok(())
    }

    /// Drops the cached cart. The server cart is left alone.
    pub fn reset_local(&self) {
        reset_cache(&self.stale, &self.throttle, &self.state);
    }

    async fn remove_line(&self, dish_id: i64) -> ClientResult<()> {
        self.require_auth().await?;
        let line_id = self.line_id(dish_id).await?;
        let path = format!("{}/{}", CART_ITEMS_PATH, line_id);
        self.auth
            .authorized(|| self.http.delete::<IgnoredAny>(&path))
            .await?;
        tracing::info!(dish_id, "item removed from cart");
        Ok(())
    }

    async fn update_line(&self, dish_id: i64, quantity: u32) -> ClientResult<()> {
        self.require_auth().await?;
        let line_id = self.line_id(dish_id).await?;
        let path = format!("{}/{}", CART_ITEMS_PATH, line_id);
        let body = CartQuantityUpdate { quantity };
        self.auth
            .authorized(|| self.http.put::<IgnoredAny, _>(&path, &body))
            .await?;
        tracing::info!(dish_id, quantity, "cart quantity updated");
        Ok(())
    }

    async fn clear_remote(&self) -> ClientResult<()> {
        self.require_auth().await?;
        self.auth
            .authorized(|| self.http.delete::<IgnoredAny>(CART_PATH))
            .await?;
        Ok(())
    }

    /// Server-side line id of the line holding `dish_id`
    async fn line_id(&self, dish_id: i64) -> ClientResult<i64> {
        let cart = self.fetch_cart().await?;
        cart.find_by_dish(dish_id)
            .map(|item| item.id)
            .ok_or_else(|| ClientError::NotFound(format!("Prato {} não está no carrinho", dish_id)))
    }

    async fn require_auth(&self) -> ClientResult<()> {
        if self.auth.is_authenticated().await {
            Ok(())
        } else {
            Err(ClientError::NotAuthenticated)
        }
    }

    /// Mirrors the outcome of an operation into the `error` field
    fn record<T>(&self, result: ClientResult<T>) -> ClientResult<T> {
        match &result {
            Ok(_) => {
                self.state.send_if_modified(|s| s.error.take().is_some());
            }
            Err(e) => {
                tracing::warn!("Cart operation failed: {}", e);
                let message = e.humanize();
                self.state.send_modify(|s| s.error = Some(message));
            }
        }
        result
    }
}

fn reset_cache(stale: &AtomicBool, throttle: &Debouncer, state: &watch::Sender<CartState>) {
    stale.store(true, Ordering::SeqCst);
    throttle.reset();
    state.send_if_modified(|s| {
        if *s == CartState::default() {
            return false;
        }
        *s = CartState::default();
        true
    });
}
