//! Data models
//!
//! Wire types of the CozinhaApp backend. Field names on the wire are the
//! backend's (Portuguese, camelCase); Rust names are English.
//! All IDs are `i64`, money is `rust_decimal::Decimal`.

pub mod cart;
pub mod category;
pub mod dish;
pub mod order;
pub mod user;

// Re-exports
pub use cart::*;
pub use category::*;
pub use dish::*;
pub use order::*;
pub use user::*;
