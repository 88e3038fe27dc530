//! Session persistence
//!
//! The session is stored under three keys, the same ones the web client
//! keeps in browser session storage: `authToken`, `refreshToken` and `user`
//! (JSON-encoded profile).

mod store;

pub use store::{Change, FileSessionStore, MemorySessionStore, SessionStore};

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use shared::User;

use crate::ClientResult;

pub const AUTH_TOKEN_KEY: &str = "authToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const USER_KEY: &str = "user";

/// Session as read back from storage
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSession {
    pub token: String,
    pub refresh_token: Option<String>,
    pub user: User,
}

/// Typed access to the session keys of a [`SessionStore`]
#[derive(Clone)]
pub struct SessionStorage {
    store: Arc<dyn SessionStore>,
}

impl fmt::Debug for SessionStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStorage").finish_non_exhaustive()
    }
}

impl SessionStorage {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Storage that lives as long as the process
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()))
    }

    /// Storage persisted to a JSON file
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileSessionStore::new(path)))
    }

    /// Underlying key/value store
    pub fn store(&self) -> &dyn SessionStore {
        self.store.as_ref()
    }

    /// Writes the three keys as one batch; on failure the previous session stays
    pub fn save(&self, token: &str, refresh_token: Option<&str>, user: &User) -> ClientResult<()> {
        let user_json = serde_json::to_string(user)?;
        self.store.write_batch(&[
            (AUTH_TOKEN_KEY, Some(token)),
            (REFRESH_TOKEN_KEY, refresh_token),
            (USER_KEY, Some(user_json.as_str())),
        ])
    }

    /// Loads the stored session. Needs both a token and a decodable user;
    /// anything less is treated as no session.
    pub fn load(&self) -> Option<StoredSession> {
        let token = self.store.get(AUTH_TOKEN_KEY)?;
        let user_json = self.store.get(USER_KEY)?;
        let user = match serde_json::from_str::<User>(&user_json) {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!("Discarding stored user that failed to decode: {}", e);
                return None;
            }
        };
        Some(StoredSession {
            token,
            refresh_token: self.store.get(REFRESH_TOKEN_KEY),
            user,
        })
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.store.get(REFRESH_TOKEN_KEY)
    }

    /// Removes all three session keys
    pub fn clear(&self) -> ClientResult<()> {
        self.store.write_batch(&[
            (AUTH_TOKEN_KEY, None),
            (REFRESH_TOKEN_KEY, None),
            (USER_KEY, None),
        ])
    }

    /// Whether any of the session keys is present
    pub fn has_any(&self) -> bool {
        [AUTH_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY]
            .iter()
            .any(|key| self.store.get(key).is_some())
    }
}
