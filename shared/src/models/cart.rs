//! Cart Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single dish-and-quantity entry in the user's cart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    /// Server-side cart line ID (used by update/delete endpoints)
    pub id: i64,
    #[serde(rename = "pratoId")]
    pub dish_id: i64,
    #[serde(rename = "nomePrato", default)]
    pub name: String,
    /// Price in currency unit
    #[serde(rename = "precoUnitario")]
    pub unit_price: Decimal,
    #[serde(rename = "quantidade")]
    pub quantity: u32,
    #[serde(rename = "imagemUrl", default)]
    pub image_url: Option<String>,
    #[serde(rename = "observacoes", default)]
    pub observations: Option<String>,
}

impl CartItem {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// The authenticated user's cart
///
/// Totals are always derived from the lines; whatever the backend sends in
/// `totalItens`/`valorTotal` is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Cart {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "itens", default)]
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities across all lines
    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn find_by_dish(&self, dish_id: i64) -> Option<&CartItem> {
        self.items.iter().find(|i| i.dish_id == dish_id)
    }
}

/// Add-to-cart payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLineInput {
    #[serde(rename = "pratoId")]
    pub dish_id: i64,
    #[serde(rename = "quantidade")]
    pub quantity: u32,
    #[serde(rename = "observacoes", skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
}

impl CartLineInput {
    pub fn new(dish_id: i64, quantity: u32) -> Self {
        Self {
            dish_id,
            quantity,
            observations: None,
        }
    }

    pub fn with_observations(mut self, observations: impl Into<String>) -> Self {
        self.observations = Some(observations.into());
        self
    }
}

/// Update-quantity payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartQuantityUpdate {
    #[serde(rename = "quantidade")]
    pub quantity: u32,
}
