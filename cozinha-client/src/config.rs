//! Client configuration

use std::path::PathBuf;
use std::time::Duration;

use crate::cart::{CartConfig, SyncConfig};

/// Environment variable holding the backend base URL
pub const API_URL_ENV: &str = "COZINHA_API_URL";
/// Environment variable holding the transport timeout, in seconds
pub const REQUEST_TIMEOUT_ENV: &str = "COZINHA_REQUEST_TIMEOUT_SECS";
/// Environment variable pointing at a session file; unset keeps the session in memory
pub const SESSION_FILE_ENV: &str = "COZINHA_SESSION_FILE";

/// Local development backend
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Client configuration
///
/// # Environment
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | COZINHA_API_URL | http://localhost:5000 | Backend base URL |
/// | COZINHA_REQUEST_TIMEOUT_SECS | 30 | Transport timeout |
/// | COZINHA_SESSION_FILE | (unset) | Persist the session to this JSON file |
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL (e.g., "http://localhost:5000")
    pub base_url: String,

    /// Transport-level request timeout
    pub timeout: Duration,

    /// Session file; `None` keeps the session in memory
    pub session_file: Option<PathBuf>,

    /// Cart manager throttling and timeouts
    pub cart: CartConfig,

    /// Cart sync adapter debounce
    pub sync: SyncConfig,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            session_file: None,
            cart: CartConfig::default(),
            sync: SyncConfig::default(),
        }
    }

    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let base_url = std::env::var(API_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let mut config = Self::new(base_url);
        if let Some(secs) = std::env::var(REQUEST_TIMEOUT_ENV)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.timeout = Duration::from_secs(secs);
        }
        config.session_file = std::env::var(SESSION_FILE_ENV).ok().map(PathBuf::from);
        config
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = Some(path.into());
        self
    }

    pub fn with_cart_config(mut self, cart: CartConfig) -> Self {
        self.cart = cart;
        self
    }

    pub fn with_sync_config(mut self, sync: SyncConfig) -> Self {
        self.sync = sync;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}
