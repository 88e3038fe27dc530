// cozinha-client/src/client/http.rs
// HTTP transport - network implementation

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::ApiErrorBody;
use tokio::sync::RwLock;

use crate::{ClientError, ClientResult};

/// HTTP transport used by every service in this crate.
///
/// Implementations share the bearer token between clones, so installing a
/// token through one handle (the auth manager) is seen by all others
/// (cart, checkout, orders).
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get<T: DeserializeOwned + Send>(&self, path: &str) -> ClientResult<T>;
    async fn post<T: DeserializeOwned + Send, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T>;
    async fn post_empty<T: DeserializeOwned + Send>(&self, path: &str) -> ClientResult<T>;
    async fn put<T: DeserializeOwned + Send, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T>;
    async fn put_empty<T: DeserializeOwned + Send>(&self, path: &str) -> ClientResult<T>;
    async fn delete<T: DeserializeOwned + Send>(&self, path: &str) -> ClientResult<T>;
    async fn set_token(&self, token: Option<String>);
    async fn token(&self) -> Option<String>;
}

/// Maps a non-success response to a [`ClientError`].
pub(crate) fn status_error(status: StatusCode, body: &[u8]) -> ClientError {
    let text = String::from_utf8_lossy(body).to_string();
    let message = serde_json::from_slice::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.summary())
        .unwrap_or(text);
    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized(message),
        StatusCode::FORBIDDEN => ClientError::Forbidden(message),
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        StatusCode::BAD_REQUEST => ClientError::Validation(message),
        _ => ClientError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

/// Decodes a success body. Empty bodies (204, bare 200) decode as JSON `null`
/// so callers can ask for `()` or `Option<T>`.
pub(crate) fn decode_body<T: DeserializeOwned>(body: &[u8]) -> ClientResult<T> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"null".as_slice()
    } else {
        body
    };
    serde_json::from_slice(body)
        .map_err(|e| ClientError::InvalidResponse(format!("JSON parse error: {}", e)))
}

/// Network HTTP client
#[derive(Debug, Clone)]
pub struct NetworkHttpClient {
    client: Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl NetworkHttpClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(None)),
        })
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> ClientResult<T> {
        let req = match self.token.read().await.as_ref() {
            Some(token) => req.bearer_auth(token),
            None => req,
        };
        let response = req.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        decode_body(&body)
    }
}

#[async_trait]
impl HttpClient for NetworkHttpClient {
    async fn get<T: DeserializeOwned + Send>(&self, path: &str) -> ClientResult<T> {
        self.send(self.client.get(self.url(path))).await
    }

    async fn post<T: DeserializeOwned + Send, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.send(self.client.post(self.url(path)).json(body)).await
    }

    async fn post_empty<T: DeserializeOwned + Send>(&self, path: &str) -> ClientResult<T> {
        self.send(self.client.post(self.url(path))).await
    }

    async fn put<T: DeserializeOwned + Send, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.send(self.client.put(self.url(path)).json(body)).await
    }

    async fn put_empty<T: DeserializeOwned + Send>(&self, path: &str) -> ClientResult<T> {
        self.send(self.client.put(self.url(path))).await
    }

    async fn delete<T: DeserializeOwned + Send>(&self, path: &str) -> ClientResult<T> {
        self.send(self.client.delete(self.url(path))).await
    }

    async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }
}
