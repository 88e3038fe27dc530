//! Checkout
//!
//! Turns the current cart plus delivery and payment details into an order.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::models::{CreateOrderItem, CreateOrderRequest};
use shared::{Cart, Order, PaymentMethod};
use validator::{Validate, ValidationError};

use crate::auth::{AuthManager, claims};
use crate::cart::CartManager;
use crate::client::HttpClient;
use crate::{ClientError, ClientResult, validation};

const ORDERS_PATH: &str = "/api/pedidos";

pub const ADDRESS_REQUIRED: &str = "Endereço de entrega é obrigatório";
pub const PAYMENT_REQUIRED: &str = "Forma de pagamento é obrigatória";
pub const PAYMENT_INVALID: &str = "Forma de pagamento inválida";
pub const EMPTY_CART: &str = "O carrinho está vazio";

/// Checkout form
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CheckoutData {
    #[serde(rename = "enderecoEntrega", default)]
    #[validate(custom(function = "validate_address"))]
    pub delivery_address: String,
    #[serde(rename = "formaPagamento", default)]
    #[validate(custom(function = "validate_payment_method"))]
    pub payment_method: String,
    #[serde(rename = "observacoes", default)]
    pub observations: Option<String>,
}

impl CheckoutData {
    pub fn new(delivery_address: impl Into<String>, payment_method: PaymentMethod) -> Self {
        Self {
            delivery_address: delivery_address.into(),
            payment_method: payment_method.as_str().to_string(),
            observations: None,
        }
    }

    pub fn with_observations(mut self, observations: impl Into<String>) -> Self {
        self.observations = Some(observations.into());
        self
    }
}

fn validate_address(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message(ADDRESS_REQUIRED.into()));
    }
    Ok(())
}

fn validate_payment_method(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message(PAYMENT_REQUIRED.into()));
    }
    if PaymentMethod::parse(value).is_none() {
        return Err(ValidationError::new("invalid").with_message(PAYMENT_INVALID.into()));
    }
    Ok(())
}

/// Human-readable problems with the checkout form; empty when it can be submitted
pub fn validate_checkout_data(data: &CheckoutData, cart: &Cart) -> Vec<String> {
    let mut errors = match data.validate() {
        Ok(()) => Vec::new(),
        Err(e) => validation::messages(&e),
    };
    if cart.is_empty() {
        errors.push(EMPTY_CART.to_string());
    }
    errors
}

/// Builds the create-order payload from the cart lines
pub fn build_order_request(
    user_id: &str,
    data: &CheckoutData,
    cart: &Cart,
) -> ClientResult<CreateOrderRequest> {
    let payment_method = PaymentMethod::parse(&data.payment_method)
        .ok_or_else(|| ClientError::Validation(PAYMENT_INVALID.into()))?;
    let observations = data
        .observations
        .as_ref()
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty());

    Ok(CreateOrderRequest {
        user_id: user_id.to_string(),
        items: cart
            .items
            .iter()
            .map(|item| CreateOrderItem {
                dish_id: item.dish_id,
                quantity: item.quantity,
                observations: item.observations.clone(),
            })
            .collect(),
        delivery_address: data.delivery_address.trim().to_string(),
        payment_method,
        observations,
    })
}

/// Checkout orchestrator
#[derive(Debug)]
pub struct CheckoutService<C> {
    http: C,
    auth: Arc<AuthManager<C>>,
    cart: Arc<CartManager<C>>,
}

impl<C: HttpClient> CheckoutService<C> {
    pub fn new(http: C, auth: Arc<AuthManager<C>>, cart: Arc<CartManager<C>>) -> Self {
        Self { http, auth, cart }
    }

    /// Submits the current cart as an order and clears the cart.
    ///
    /// The token's subject claim is checked locally before anything goes to
    /// the network. Backend errors from the order submission are returned
    /// as they are.
    pub async fn process_checkout(&self, data: &CheckoutData) -> ClientResult<Order> {
        let state = self.auth.state().await;
        let token = match (&state.user, state.token) {
            (Some(_), Some(token)) => token,
            _ => return Err(ClientError::NotAuthenticated),
        };
        let user_id = claims::subject(&token)?;

        let cart = self.cart.fetch_cart().await?;
        let errors = validate_checkout_data(data, &cart);
        if !errors.is_empty() {
            return Err(ClientError::ValidationErrors(errors));
        }

        let request = build_order_request(&user_id, data, &cart)?;
        let order: Order = self.http.post(ORDERS_PATH, &request).await?;
        tracing::info!(
            order_number = %order.order_number,
            total = %order.total_value,
            "order created"
        );

        if let Err(e) = self.cart.clear_cart().await {
            tracing::warn!("Order {} created but clearing the cart failed: {}", order.order_number, e);
        }
        Ok(order)
    }
}
