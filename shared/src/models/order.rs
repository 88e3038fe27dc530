//! Order Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order lifecycle status
///
/// `Pendente -> Confirmado -> Preparando -> SaiuParaEntrega -> Entregue`,
/// with `Cancelado` reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum OrderStatus {
    #[default]
    Pendente,
    Confirmado,
    Preparando,
    SaiuParaEntrega,
    Entregue,
    Cancelado,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Entregue | Self::Cancelado)
    }

    pub fn can_cancel(&self) -> bool {
        !self.is_terminal()
    }

    /// The next step in the normal flow, if any
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Pendente => Some(Self::Confirmado),
            Self::Confirmado => Some(Self::Preparando),
            Self::Preparando => Some(Self::SaiuParaEntrega),
            Self::SaiuParaEntrega => Some(Self::Entregue),
            Self::Entregue | Self::Cancelado => None,
        }
    }

    pub fn can_transition_to(&self, target: Self) -> bool {
        if target == Self::Cancelado {
            return self.can_cancel();
        }
        self.next() == Some(target)
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pendente => "Pendente",
            Self::Confirmado => "Confirmado",
            Self::Preparando => "Preparando",
            Self::SaiuParaEntrega => "Saiu para entrega",
            Self::Entregue => "Entregue",
            Self::Cancelado => "Cancelado",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Accepted payment methods
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    #[serde(rename = "PIX")]
    Pix,
    CartaoCredito,
    CartaoDebito,
    Dinheiro,
}

impl PaymentMethod {
    pub const ALL: [Self; 4] = [
        Self::Pix,
        Self::CartaoCredito,
        Self::CartaoDebito,
        Self::Dinheiro,
    ];

    /// Wire name, as the backend expects it
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pix => "PIX",
            Self::CartaoCredito => "CartaoCredito",
            Self::CartaoDebito => "CartaoDebito",
            Self::Dinheiro => "Dinheiro",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == value.trim())
    }
}

/// Order line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    #[serde(rename = "pratoId")]
    pub dish_id: i64,
    #[serde(rename = "nomePrato", default)]
    pub name: String,
    #[serde(rename = "quantidade")]
    pub quantity: u32,
    /// Price in currency unit
    #[serde(rename = "precoUnitario")]
    pub unit_price: Decimal,
    #[serde(rename = "observacoes", default)]
    pub observations: Option<String>,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: i64,
    #[serde(rename = "numeroPedido")]
    pub order_number: String,
    #[serde(rename = "itens", default)]
    pub items: Vec<OrderItem>,
    /// Total amount in currency unit
    #[serde(rename = "valorTotal")]
    pub total_value: Decimal,
    pub status: OrderStatus,
    #[serde(rename = "enderecoEntrega", default)]
    pub delivery_address: Option<String>,
    #[serde(rename = "formaPagamento", default)]
    pub payment_method: Option<String>,
    #[serde(rename = "observacoes", default)]
    pub observations: Option<String>,
    #[serde(rename = "dataPedido", default)]
    pub created_at: Option<String>,
}

/// Order line in a create-order payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateOrderItem {
    #[serde(rename = "pratoId")]
    pub dish_id: i64,
    #[serde(rename = "quantidade")]
    pub quantity: u32,
    #[serde(rename = "observacoes", skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateOrderRequest {
    #[serde(rename = "usuarioId")]
    pub user_id: String,
    #[serde(rename = "itens")]
    pub items: Vec<CreateOrderItem>,
    #[serde(rename = "enderecoEntrega")]
    pub delivery_address: String,
    #[serde(rename = "formaPagamento")]
    pub payment_method: PaymentMethod,
    #[serde(rename = "observacoes", skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
}
