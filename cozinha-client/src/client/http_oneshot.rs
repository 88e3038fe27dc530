// cozinha-client/src/client/http_oneshot.rs
// Oneshot HTTP client - in-process calls into an axum Router

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use http::Request;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceExt;

use crate::{ClientError, ClientResult};

use super::http::{HttpClient, decode_body, status_error};

/// Oneshot HTTP client (in-memory calls)
///
/// Drives an axum [`Router`] through Tower's `oneshot`, with no network in
/// between. Used to embed a backend in the same process and to test services
/// against a mock backend.
///
/// # Example
///
/// ```ignore
/// use axum::Router;
/// use cozinha_client::OneshotHttpClient;
///
/// let router: Router = build_mock_backend();
/// let client = OneshotHttpClient::new(router);
/// let categories: Vec<Category> = client.get("/api/categorias").await?;
/// ```
#[derive(Debug, Clone)]
pub struct OneshotHttpClient {
    router: Router,
    token: Arc<RwLock<Option<String>>>,
}

impl OneshotHttpClient {
    /// `router` must already have its state attached (`with_state` called)
    pub fn new(router: Router) -> Self {
        Self {
            router,
            token: Arc::new(RwLock::new(None)),
        }
    }

    async fn build_request(
        &self,
        method: http::Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> ClientResult<Request<Body>> {
        let uri = format!("/{}", path.trim_start_matches('/'));
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = self.token.read().await.as_ref() {
            builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let body = match body {
            Some(bytes) => {
                builder = builder.header(http::header::CONTENT_TYPE, "application/json");
                Body::from(bytes)
            }
            None => Body::empty(),
        };

        builder
            .body(body)
            .map_err(|e| ClientError::Internal(format!("Failed to build request: {}", e)))
    }

    async fn execute<T: DeserializeOwned>(&self, request: Request<Body>) -> ClientResult<T> {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| ClientError::Network(format!("Oneshot call failed: {}", e)))?;

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| ClientError::Network(format!("Failed to read body: {}", e)))?;

        if !status.is_success() {
            return Err(status_error(status, &body_bytes));
        }
        decode_body(&body_bytes)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: http::Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> ClientResult<T> {
        let request = self.build_request(method, path, body).await?;
        self.execute(request).await
    }
}

#[async_trait]
impl HttpClient for OneshotHttpClient {
    async fn get<T: DeserializeOwned + Send>(&self, path: &str) -> ClientResult<T> {
        self.call(http::Method::GET, path, None).await
    }

    async fn post<T: DeserializeOwned + Send, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let bytes = serde_json::to_vec(body)?;
        self.call(http::Method::POST, path, Some(bytes)).await
    }

    async fn post_empty<T: DeserializeOwned + Send>(&self, path: &str) -> ClientResult<T> {
        self.call(http::Method::POST, path, None).await
    }

    async fn put<T: DeserializeOwned + Send, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let bytes = serde_json::to_vec(body)?;
        self.call(http::Method::PUT, path, Some(bytes)).await
    }

    async fn put_empty<T: DeserializeOwned + Send>(&self, path: &str) -> ClientResult<T> {
        self.call(http::Method::PUT, path, None).await
    }

    async fn delete<T: DeserializeOwned + Send>(&self, path: &str) -> ClientResult<T> {
        self.call(http::Method::DELETE, path, None).await
    }

    async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;

    async fn whoami(headers: HeaderMap) -> Result<String, StatusCode> {
        headers
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| serde_json::to_string(v).unwrap_or_default())
            .ok_or(StatusCode::UNAUTHORIZED)
    }

    #[tokio::test]
    async fn test_bearer_header_and_status_mapping() {
        let router = Router::new().route("/api/auth/me", get(whoami));
        let client = OneshotHttpClient::new(router);

        let err = client.get::<String>("api/auth/me").await.unwrap_err();
        assert!(matches!(err, ClientError::Unauthorized(_)));

        client.set_token(Some("t0k3n".into())).await;
        let header: String = client.get("/api/auth/me").await.unwrap();
        assert_eq!(header, "Bearer t0k3n");
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let client = OneshotHttpClient::new(Router::new());
        let err = client.delete::<()>("/api/nada").await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));
    }
}
