//! Dish Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Category;

/// A dish on the menu
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dish {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    /// Price in currency unit
    #[serde(rename = "preco")]
    pub price: Decimal,
    #[serde(rename = "imagemUrl", default)]
    pub image_url: Option<String>,
    #[serde(rename = "categoriaId", default)]
    pub category_id: Option<i64>,
    #[serde(rename = "disponivel", default = "default_true")]
    pub is_available: bool,
}

fn default_true() -> bool {
    true
}

/// Result of the global search endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SearchResults {
    #[serde(rename = "pratos", default)]
    pub dishes: Vec<Dish>,
    #[serde(rename = "categorias", default)]
    pub categories: Vec<Category>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.dishes.is_empty() && self.categories.is_empty()
    }
}
