//! Order history and cancellation for the logged-in user

use std::sync::Arc;

use serde::de::IgnoredAny;
use shared::Order;

use crate::auth::AuthManager;
use crate::client::HttpClient;
use crate::{ClientError, ClientResult};

const ORDERS_PATH: &str = "/api/pedidos";
const MY_ORDERS_PATH: &str = "/api/pedidos/meus-pedidos";

#[derive(Debug)]
pub struct OrderService<C> {
    http: C,
    auth: Arc<AuthManager<C>>,
}

impl<C: HttpClient> OrderService<C> {
    pub fn new(http: C, auth: Arc<AuthManager<C>>) -> Self {
        Self { http, auth }
    }

    /// Orders of the current user, as the backend sorts them
    pub async fn my_orders(&self) -> ClientResult<Vec<Order>> {
        self.require_auth().await?;
        self.auth
            .authorized(|| self.http.get::<Vec<Order>>(MY_ORDERS_PATH))
            .await
    }

    pub async fn order(&self, id: i64) -> ClientResult<Order> {
        self.require_auth().await?;
        let path = format!("{}/{}", ORDERS_PATH, id);
        self.auth.authorized(|| self.http.get::<Order>(&path)).await
    }

    /// Cancels an order. Delivered and already-cancelled orders are refused
    /// locally. Returns the order as the backend reports it afterwards.
    pub async fn cancel_order(&self, id: i64) -> ClientResult<Order> {
        let order = self.order(id).await?;
        if !order.status.can_cancel() {
            return Err(ClientError::Validation(format!(
                "Pedido {} não pode ser cancelado (status: {})",
                order.order_number, order.status
            )));
        }

        let path = format!("{}/{}/cancelar", ORDERS_PATH, id);
        self.auth
            .authorized(|| self.http.put_empty::<IgnoredAny>(&path))
            .await?;
        tracing::info!(order_number = %order.order_number, "order cancelled");
        self.order(id).await
    }

    async fn require_auth(&self) -> ClientResult<()> {
        if self.auth.is_authenticated().await {
            Ok(())
        } else {
            Err(ClientError::NotAuthenticated)
        }
    }
}
