//! Shared types for CozinhaApp clients
//!
//! Wire types of the CozinhaApp REST backend: domain models, auth DTOs and
//! the error body format.

pub mod client;
pub mod models;
pub mod response;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use client::{AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest};
pub use models::{Cart, CartItem, Order, OrderStatus, PaymentMethod, User, UserRole};
pub use response::ApiErrorBody;
