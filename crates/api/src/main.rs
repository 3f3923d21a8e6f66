//! API server entry point.

use api::AppState;
use api::config::Config;
use domain::Money;
use ledger::{StockLedger, StockRecord};
use saga::{AuthUser, Product};
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

/// Seeds demo catalog products, stock and credentials so the server is
/// usable out of the box.
async fn seed_demo_data(state: &AppState) {
    state.catalog.add_product(Product::new(
        "SKU-1001",
        "Mechanical Keyboard",
        Money::from_cents(4999),
    ));
    state.catalog.add_product(Product::new(
        "SKU-1002",
        "Wireless Mouse",
        Money::from_cents(1999),
    ));

    for (id, name, quantity) in [("SKU-1001", "Mechanical Keyboard", 50), ("SKU-1002", "Wireless Mouse", 8)] {
        if let Err(error) = state
            .ledger
            .create(StockRecord::new(id, name, quantity, 10, Some("warehouse-1".to_string())))
            .await
        {
            tracing::warn!(product_id = id, %error, "failed to seed stock record");
        }
    }

    state.identity.register(
        "admin-token",
        AuthUser::admin("admin-1", "admin@example.com", "Admin"),
    );
    state.identity.register(
        "client-token",
        AuthUser::client("client-1", "client@example.com", "Demo Client"),
    );

    tracing::info!("seeded demo catalog, stock and credentials");
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Create application state and seed demo data
    let state = api::create_default_state();
    seed_demo_data(&state).await;

    // 4. Start the cancelled-order retention job
    let _purge_task = api::cleanup::spawn_purge_task(state.journal.clone(), config.retention_days);

    // 5. Build the application
    let app = api::create_app(state, metrics_handle);

    // 6. Start server
    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}
