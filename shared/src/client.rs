//! Client-related types shared between the backend contract and clients
//!
//! Request/response DTOs of the `/api/auth` endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::User;

// =============================================================================
// Auth API DTOs
// =============================================================================

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(rename = "nomeCompleto")]
    #[validate(length(min = 3, message = "Nome completo deve ter pelo menos 3 caracteres"))]
    pub full_name: String,
    #[validate(email(message = "E-mail inválido"))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter pelo menos 6 caracteres"))]
    pub password: String,
    #[serde(rename = "confirmPassword")]
    #[validate(must_match(other = "password", message = "As senhas não conferem"))]
    pub confirm_password: String,
    #[serde(rename = "endereco", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(rename = "cidade", skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(rename = "dataNascimento", skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
}

/// Change password request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[serde(rename = "currentPassword")]
    #[validate(length(min = 1, message = "Informe a senha atual"))]
    pub current_password: String,
    #[serde(rename = "newPassword")]
    #[validate(length(min = 6, message = "A nova senha deve ter pelo menos 6 caracteres"))]
    pub new_password: String,
    #[serde(rename = "confirmNewPassword")]
    #[validate(must_match(other = "new_password", message = "As senhas não conferem"))]
    pub confirm_new_password: String,
}

/// Refresh token request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    pub token: Option<String>,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

/// Login / register / refresh response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    #[serde(rename = "expiresAt", default)]
    pub expires_at: Option<DateTime<Utc>>,
    pub user: User,
}
