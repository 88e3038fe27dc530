// cozinha-client/examples/checkout_flow.rs
// Login, fill the cart and place an order against a running backend

use cozinha_client::{CartLineInput, ClientConfig, CozinhaClient, LoginRequest, PaymentMethod};
use cozinha_client::checkout::CheckoutData;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cozinha_client=debug,info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        println!("Usage: {} <email> <password> <address>", args[0]);
        println!(
            "  Example: {} admin@cozinhaapp.com 'Admin123!@#' 'Rua das Flores, 10'",
            args[0]
        );
        return Ok(());
    }

    let config = ClientConfig::from_env();
    tracing::info!("Backend: {}", config.base_url);
    let client = CozinhaClient::new(config)?;
    let sync = client.spawn_cart_sync();

    if !client.restore().await {
        let user = client
            .auth()
            .login(&LoginRequest::new(&args[1], &args[2]))
            .await?;
        tracing::info!("Logged in as {} ({:?})", user.full_name, user.role);
    }

    let categories = client.menu().categories().await?;
    tracing::info!("{} categories", categories.len());

    let dishes = client.menu().dishes(None).await?;
    let Some(dish) = dishes.iter().find(|d| d.is_available) else {
        tracing::warn!("No dish available right now");
        return Ok(());
    };

    client.cart().add_item(&CartLineInput::new(dish.id, 2)).await?;
    let cart = client.cart().load_cart().await?;
    tracing::info!(
        "Cart: {} items, total R$ {}",
        cart.total_items(),
        cart.total_price()
    );

    let data = CheckoutData::new(&args[3], PaymentMethod::Pix);
    match client.checkout().process_checkout(&data).await {
        Ok(order) => tracing::info!("Order {} placed: {}", order.order_number, order.status),
        Err(e) => tracing::error!("Checkout failed: {}", e.humanize()),
    }

    for order in client.orders().my_orders().await? {
        println!("{:<12} {:<18} R$ {}", order.order_number, order.status, order.total_value);
    }

    sync.shutdown().await;
    Ok(())
}
