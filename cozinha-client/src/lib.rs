//! Cozinha Client - client library for the CozinhaApp ordering backend
//!
//! Session persistence, authentication, cart state with change
//! notification, checkout, menu and order history over the backend's REST
//! API.

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod client;
pub mod config;
pub mod debounce;
pub mod error;
pub mod events;
pub mod menu;
pub mod orders;
pub mod session;
mod validation;

pub use auth::{AuthManager, AuthState};
pub use cart::{CartConfig, CartEventBus, CartManager, CartState, CartSync, SyncConfig};
pub use checkout::{CheckoutData, CheckoutService, validate_checkout_data};
pub use client::{CozinhaClient, HttpClient, NetworkHttpClient, OneshotHttpClient};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use events::{AppEvent, AppEvents};
pub use menu::MenuService;
pub use orders::OrderService;
pub use session::{SessionStorage, SessionStore};

// Re-export shared types for convenience
pub use shared::models::{CartLineInput, PaymentMethod};
pub use shared::{Cart, LoginRequest, Order, OrderStatus, User};
