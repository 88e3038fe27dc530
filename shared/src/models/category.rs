//! Category Model

use serde::{Deserialize, Serialize};

/// Menu category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    #[serde(rename = "ativo", default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}
