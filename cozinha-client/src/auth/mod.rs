//! Authentication state
//!
//! [`AuthManager`] owns the current user and tokens, keeps them mirrored in
//! the session store and installs the bearer token on the shared transport.
//! The user counts as authenticated only while both a user and a token are
//! held.

pub mod claims;

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use serde::de::IgnoredAny;
use shared::client::RefreshTokenRequest;
use shared::{AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest, User};
use tokio::sync::{Mutex, RwLock};
use validator::Validate;

use crate::client::HttpClient;
use crate::events::{AppEvent, AppEvents};
use crate::session::SessionStorage;
use crate::{ClientError, ClientResult, validation};

const LOGIN_PATH: &str = "/api/auth/login";
const REGISTER_PATH: &str = "/api/auth/register";
const LOGOUT_PATH: &str = "/api/auth/logout";
const REFRESH_PATH: &str = "/api/auth/refresh-token";
const CHANGE_PASSWORD_PATH: &str = "/api/auth/change-password";
const ME_PATH: &str = "/api/auth/me";

/// Snapshot of the authentication state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub token: Option<String>,
    pub refresh_token: Option<String>,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }
}

type ClearHook = Arc<dyn Fn() + Send + Sync>;

/// Auth state manager
pub struct AuthManager<C> {
    http: C,
    storage: SessionStorage,
    events: AppEvents,
    state: RwLock<AuthState>,
    /// Held for the whole refresh exchange; the backend rotates refresh tokens
    refresh_gate: Mutex<()>,
    clear_hooks: StdMutex<Vec<ClearHook>>,
}

impl<C> fmt::Debug for AuthManager<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthManager")
            .field("storage", &self.storage)
            .field("events", &self.events)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<C: HttpClient> AuthManager<C> {
    /// `http` should be a clone of the transport the other services use, so
    /// they all see the installed token.
    pub fn new(http: C, storage: SessionStorage, events: AppEvents) -> Self {
        Self {
            http,
            storage,
            events,
            state: RwLock::new(AuthState::default()),
            refresh_gate: Mutex::new(()),
            clear_hooks: StdMutex::new(Vec::new()),
        }
    }

    /// Registers a callback run every time the local session is cleared:
    /// explicit logout, failed refresh or a discarded stored session.
    pub fn on_session_cleared(&self, hook: impl Fn() + Send + Sync + 'static) {
        self.clear_hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(hook));
    }

    pub async fn state(&self) -> AuthState {
        self.state.read().await.clone()
    }

    pub async fn user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    pub async fn token(&self) -> Option<String> {
        self.state.read().await.token.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated()
    }

    pub fn storage(&self) -> &SessionStorage {
        &self.storage
    }

    pub fn events(&self) -> &AppEvents {
        &self.events
    }

    /// Logs in. On failure the previous state is left as it was.
    pub async fn login(&self, credentials: &LoginRequest) -> ClientResult<User> {
        let response = self
            .http
            .post::<AuthResponse, _>(LOGIN_PATH, credentials)
            .await
            .map_err(|e| match e {
                ClientError::Unauthorized(msg) | ClientError::Validation(msg) => {
                    ClientError::Auth(non_empty_or(msg, "E-mail ou senha inválidos"))
                }
                other => other,
            })?;

        let user = self.apply(response).await?;
        tracing::info!(email = %user.email, role = ?user.role, "Login succeeded");
        self.events.emit(AppEvent::LoginSuccess);
        Ok(user)
    }

    /// Registers a new account and logs it in
    pub async fn register(&self, data: &RegisterRequest) -> ClientResult<User> {
        if let Err(errors) = data.validate() {
            return Err(ClientError::ValidationErrors(validation::messages(&errors)));
        }

        let response = self
            .http
            .post::<AuthResponse, _>(REGISTER_PATH, data)
            .await?;
        let user = self.apply(response).await?;
        tracing::info!(email = %user.email, "Registration succeeded");
        Ok(user)
    }

    /// Logs out. The server call is best effort; local state is always cleared.
    pub async fn logout(&self) {
        let (token, refresh_token) = {
            let state = self.state.read().await;
            (state.token.clone(), state.refresh_token.clone())
        };
        if token.is_some() || refresh_token.is_some() {
            let body = serde_json::json!({ "refreshToken": refresh_token });
            if let Err(e) = self.http.post::<IgnoredAny, _>(LOGOUT_PATH, &body).await {
                tracing::warn!("Server-side logout failed, clearing local session anyway: {}", e);
            }
        }
        self.clear_local().await;
        tracing::info!("Logged out");
    }

    /// Exchanges the refresh token for a new session. Any failure clears the
    /// whole session (forced logout).
    ///
    /// Only one exchange runs at a time; concurrent callers wait for it.
    pub async fn refresh_auth_token(&self) -> ClientResult<()> {
        let _gate = self.refresh_gate.lock().await;
        self.exchange_refresh_token().await
    }

    /// Refresh after the backend rejected `rejected`. If another call already
    /// replaced that token while we waited for the gate, the new one is used
    /// as is.
    async fn refresh_rejected(&self, rejected: Option<&str>) -> ClientResult<()> {
        let _gate = self.refresh_gate.lock().await;
        let current = self.token().await;
        if current.is_some() && current.as_deref() != rejected {
            tracing::debug!("Token already refreshed by a concurrent call");
            return Ok(());
        }
        self.exchange_refresh_token().await
    }

    async fn exchange_refresh_token(&self) -> ClientResult<()> {
        let (token, refresh_token) = {
            let state = self.state.read().await;
            (state.token.clone(), state.refresh_token.clone())
        };
        let refresh_token = refresh_token.or_else(|| self.storage.refresh_token());

        let Some(refresh_token) = refresh_token else {
            tracing::info!("No refresh token available, clearing session");
            self.clear_local().await;
            return Err(ClientError::Auth("Sessão expirada".into()));
        };

        let request = RefreshTokenRequest {
            token,
            refresh_token,
        };
        let result = match self
            .http
            .post::<AuthResponse, _>(REFRESH_PATH, &request)
            .await
        {
            Ok(response) => self.apply(response).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(_) => {
                tracing::info!("Access token refreshed");
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Token refresh failed, clearing session: {}", e);
                self.clear_local().await;
                Err(match e {
                    ClientError::Unauthorized(_) | ClientError::Validation(_) => {
                        ClientError::Auth("Sessão expirada".into())
                    }
                    other => other,
                })
            }
        }
    }

    /// Changes the password of the logged-in user
    pub async fn change_password(&self, data: &ChangePasswordRequest) -> ClientResult<()> {
        if self.state.read().await.token.is_none() {
            return Err(ClientError::Auth("Usuário não autenticado".into()));
        }
        if let Err(errors) = data.validate() {
            return Err(ClientError::ValidationErrors(validation::messages(&errors)));
        }

        self.authorized(|| self.http.post::<IgnoredAny, _>(CHANGE_PASSWORD_PATH, data))
            .await?;
        tracing::info!("Password changed");
        Ok(())
    }

    /// Restores the session kept in storage and checks it with the backend.
    ///
    /// A rejected token is refreshed; if that fails too the session is
    /// cleared. When the backend cannot be reached the stored session is
    /// kept. Returns whether the client ends up authenticated.
    pub async fn restore(&self) -> bool {
        let Some(stored) = self.storage.load() else {
            if self.storage.has_any() {
                tracing::info!("Incomplete stored session, clearing");
                self.clear_local().await;
            }
            return false;
        };

        self.http.set_token(Some(stored.token.clone())).await;
        {
            let mut state = self.state.write().await;
            *state = AuthState {
                user: Some(stored.user),
                token: Some(stored.token.clone()),
                refresh_token: stored.refresh_token.clone(),
            };
        }

        match self.http.get::<User>(ME_PATH).await {
            Ok(user) => {
                if let Err(e) =
                    self.storage
                        .save(&stored.token, stored.refresh_token.as_deref(), &user)
                {
                    tracing::warn!("Failed to persist refreshed profile: {}", e);
                }
                self.state.write().await.user = Some(user);
                tracing::info!("Session restored");
                true
            }
            Err(ClientError::Unauthorized(_)) => {
                tracing::info!("Stored token rejected, trying refresh");
                self.refresh_auth_token().await.is_ok()
            }
            Err(e) => {
                tracing::warn!("Could not validate stored session, keeping it: {}", e);
                true
            }
        }
    }

    /// Runs an authenticated backend call. If the backend rejects the access
    /// token the session is refreshed once and the call retried once.
    pub async fn authorized<T, F, Fut>(&self, op: F) -> ClientResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        let sent = self.token().await;
        match op().await {
            Err(ClientError::Unauthorized(msg)) => {
                tracing::debug!("Access token rejected ({}), refreshing", msg);
                self.refresh_rejected(sent.as_deref()).await?;
                op().await
            }
            other => other,
        }
    }

    /// Persists first, then updates memory and the transport, so a storage
    /// failure leaves the previous state in place.
    async fn apply(&self, response: AuthResponse) -> ClientResult<User> {
        self.storage.save(
            &response.token,
            Some(&response.refresh_token),
            &response.user,
        )?;
        self.http.set_token(Some(response.token.clone())).await;

        let mut state = self.state.write().await;
        *state = AuthState {
            user: Some(response.user.clone()),
            token: Some(response.token),
            refresh_token: Some(response.refresh_token),
        };
        Ok(response.user)
    }

    async fn clear_local(&self) {
        *self.state.write().await = AuthState::default();
        self.http.set_token(None).await;
        if let Err(e) = self.storage.clear() {
            tracing::warn!("Failed to clear stored session: {}", e);
        }

        let hooks: Vec<ClearHook> = self
            .clear_hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for hook in &hooks {
            hook();
        }
    }
}

fn non_empty_or(msg: String, fallback: &str) -> String {
    if msg.trim().is_empty() {
        fallback.to_string()
    } else {
        msg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_authenticated_needs_user_and_token() {
        let user: User = serde_json::from_str(r#"{"nomeCompleto": "Ana"}"#).unwrap();
        let mut state = AuthState::default();
        assert!(!state.is_authenticated());

        state.user = Some(user.clone());
        assert!(!state.is_authenticated());

        state.token = Some("tok".into());
        assert!(state.is_authenticated());

        state.user = None;
        assert!(!state.is_authenticated());
    }
}
