//! Saga runner entry point.
//!
//! Seeds a demo catalogue, walks one order through the full saga, and then
//! keeps the services running until a shutdown signal arrives.

use std::time::Duration;

use app::{App, Config};
use inventory::AddProduct;
use orders::{CreateOrder, OrderItem};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app = App::build(&config);

    app.inventory
        .add_product(AddProduct {
            name: "Demo widget".to_string(),
            sku: "SKU-001".into(),
            quantity: 10,
        })
        .await
        .expect("failed to seed catalogue");

    let order = app
        .orders
        .create_order(CreateOrder {
            items: vec![OrderItem {
                sku: "SKU-001".into(),
                quantity: 2,
                unit_price: 9.5,
            }],
            address: "1 Main St".to_string(),
            phone_number: "+15550100".to_string(),
        })
        .await
        .expect("failed to create demo order");
    tracing::info!(order_id = %order.id, status = %order.status, "demo order created");

    // Give the saga a moment to settle, then report where the order ended up.
    for _ in 0..100 {
        let current = app
            .orders
            .get_order(order.id)
            .await
            .expect("demo order vanished");
        if current.status.is_terminal() {
            tracing::info!(order_id = %current.id, status = %current.status, "demo order settled");
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    shutdown_signal().await;
    tracing::info!("shut down gracefully");
}
