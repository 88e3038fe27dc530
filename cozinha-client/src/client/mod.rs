//! HTTP transports and the client facade
//!
//! [`HttpClient`] is the seam every service talks through:
//! [`NetworkHttpClient`] for a real backend, [`OneshotHttpClient`] for an
//! in-process axum router.

mod cozinha_client;
pub mod http;
pub mod http_oneshot;

pub use cozinha_client::CozinhaClient;
pub use http::{HttpClient, NetworkHttpClient};
pub use http_oneshot::OneshotHttpClient;
