//! User Model

use serde::{Deserialize, Serialize};

/// Role of an account on the backend.
///
/// Roles this client does not know deserialize to [`UserRole::Other`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum UserRole {
    Admin,
    #[default]
    Usuario,
    #[serde(other)]
    Other,
}

impl UserRole {
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// User profile as returned by the auth endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "nomeCompleto")]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "endereco", default)]
    pub address: Option<String>,
    #[serde(rename = "cidade", default)]
    pub city: Option<String>,
    #[serde(rename = "dataNascimento", default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(rename = "dataCriacao", default)]
    pub created_at: Option<String>,
    #[serde(rename = "ultimoLogin", default)]
    pub last_login: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// First name, used for greetings
    pub fn first_name(&self) -> &str {
        self.full_name.split_whitespace().next().unwrap_or("")
    }
}
