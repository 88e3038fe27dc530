//! `CozinhaClient`: every service wired onto one transport.

use std::sync::Arc;

use crate::auth::AuthManager;
use crate::cart::{CartEventBus, CartManager, CartSync};
use crate::checkout::CheckoutService;
use crate::config::ClientConfig;
use crate::events::AppEvents;
use crate::menu::MenuService;
use crate::orders::OrderService;
use crate::session::SessionStorage;
use crate::ClientResult;

use super::http::{HttpClient, NetworkHttpClient};

/// All client services sharing one transport, one session and one event bus.
///
/// # Example
///
/// ```no_run
/// use cozinha_client::{ClientConfig, CozinhaClient};
/// use shared::LoginRequest;
///
/// # async fn example() -> Result<(), cozinha_client::ClientError> {
/// let client = CozinhaClient::new(ClientConfig::from_env())?;
/// client.restore().await;
/// client
///     .auth()
///     .login(&LoginRequest::new("admin@cozinhaapp.com", "Admin123!@#"))
///     .await?;
/// let cart = client.cart().load_cart().await?;
/// println!("{} itens", cart.total_items());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CozinhaClient<C = NetworkHttpClient> {
    config: ClientConfig,
    events: AppEvents,
    bus: CartEventBus,
    auth: Arc<AuthManager<C>>,
    cart: Arc<CartManager<C>>,
    checkout: CheckoutService<C>,
    menu: MenuService<C>,
    orders: OrderService<C>,
}

impl CozinhaClient<NetworkHttpClient> {
    /// Client talking to `config.base_url` over the network. The session is
    /// kept in `config.session_file` when set, in memory otherwise.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let http = NetworkHttpClient::new(&config.base_url, config.timeout)?;
        let storage = match &config.session_file {
            Some(path) => SessionStorage::file(path),
            None => SessionStorage::in_memory(),
        };
        Ok(Self::with_transport(http, storage, config))
    }
}

impl<C: HttpClient + Clone> CozinhaClient<C> {
    pub fn with_transport(http: C, storage: SessionStorage, config: ClientConfig) -> Self {
        let events = AppEvents::new();
        let bus = CartEventBus::new(events.clone());
        let auth = Arc::new(AuthManager::new(http.clone(), storage, events.clone()));
        let cart = Arc::new(CartManager::new(
            http.clone(),
            auth.clone(),
            bus.clone(),
            config.cart,
        ));
        let checkout = CheckoutService::new(http.clone(), auth.clone(), cart.clone());
        let orders = OrderService::new(http.clone(), auth.clone());
        let menu = MenuService::new(http);

        Self {
            config,
            events,
            bus,
            auth,
            cart,
            checkout,
            menu,
            orders,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn events(&self) -> &AppEvents {
        &self.events
    }

    pub fn bus(&self) -> &CartEventBus {
        &self.bus
    }

    pub fn auth(&self) -> &Arc<AuthManager<C>> {
        &self.auth
    }

    pub fn cart(&self) -> &Arc<CartManager<C>> {
        &self.cart
    }

    pub fn checkout(&self) -> &CheckoutService<C> {
        &self.checkout
    }

    pub fn menu(&self) -> &MenuService<C> {
        &self.menu
    }

    pub fn orders(&self) -> &OrderService<C> {
        &self.orders
    }

    /// Restores the stored session; returns whether the client is logged in
    pub async fn restore(&self) -> bool {
        self.auth.restore().await
    }

    /// Logs out and drops the cached cart. The server cart is kept.
    pub async fn logout(&self) {
        self.auth.logout().await;
    }

    /// Starts the cart sync adapter on the current runtime
    pub fn spawn_cart_sync(&self) -> CartSync {
        CartSync::spawn(self.bus.listen(), self.cart.watch(), self.config.sync)
    }
}
