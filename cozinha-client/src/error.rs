//! Client error types

use std::time::Duration;

use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend unreachable (in-process transport failures, connection errors)
    #[error("Network error: {0}")]
    Network(String),

    /// Operation exceeded its own deadline
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication failed: bad credentials, missing or malformed token,
    /// expired session
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Backend rejected the access token (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Operation requires a logged-in user
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error (client-side or HTTP 400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Client-side form validation produced several messages
    #[error("Validation failed: {}", .0.join("; "))]
    ValidationErrors(Vec<String>),

    /// Backend error with status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Session storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Whether this error means the current session is not usable
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Self::Auth(_) | Self::Unauthorized(_) | Self::NotAuthenticated
        )
    }

    /// Whether the backend could not be reached in time
    pub fn is_network_error(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }

    /// Message suitable for a toast notification
    pub fn humanize(&self) -> String {
        match self {
            Self::NotAuthenticated => "Faça login para continuar.".into(),
            Self::Auth(msg) if !msg.is_empty() => msg.clone(),
            Self::Auth(_) | Self::Unauthorized(_) => {
                "Sua sessão expirou. Faça login novamente.".into()
            }
            Self::Timeout(_) => "O servidor demorou para responder. Tente novamente.".into(),
            Self::Forbidden(_) => "Você não tem permissão para esta ação.".into(),
            Self::NotFound(_) => "Item não encontrado.".into(),
            Self::Validation(msg) => msg.clone(),
            Self::ValidationErrors(errors) => errors.join("\n"),
            Self::Api { message, .. } if !message.is_empty() => message.clone(),
            e if e.is_network_error() => {
                "Não foi possível conectar ao servidor. Verifique sua conexão.".into()
            }
            _ => "Ocorreu um erro inesperado. Tente novamente.".into(),
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_classification() {
        assert!(ClientError::NotAuthenticated.is_auth_error());
        assert!(ClientError::Unauthorized("expired".into()).is_auth_error());
        assert!(!ClientError::Validation("x".into()).is_auth_error());
    }

    #[test]
    fn test_humanize() {
        assert_eq!(
            ClientError::Auth("Credenciais inválidas".into()).humanize(),
            "Credenciais inválidas"
        );
        assert_eq!(
            ClientError::ValidationErrors(vec!["a".into(), "b".into()]).humanize(),
            "a\nb"
        );
        assert!(
            ClientError::Network("refused".into())
                .humanize()
                .contains("conectar")
        );
        assert!(
            ClientError::Timeout(Duration::from_secs(10))
                .humanize()
                .contains("demorou")
        );
    }

    #[test]
    fn test_display() {
        let err = ClientError::ValidationErrors(vec!["Endereço".into(), "Pagamento".into()]);
        assert_eq!(err.to_string(), "Validation failed: Endereço; Pagamento");
        let err = ClientError::Api {
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "API error 500: boom");
    }
}
