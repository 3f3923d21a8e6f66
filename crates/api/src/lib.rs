//! HTTP API server for the order fulfillment system.
//!
//! Exposes the order and inventory endpoints over axum with bearer-token
//! authentication, structured logging (tracing) and Prometheus metrics.

pub mod auth;
pub mod cleanup;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use journal::InMemoryOrderJournal;
use ledger::InMemoryStockLedger;
use metrics_exporter_prometheus::PrometheusHandle;
use saga::{InMemoryCatalogService, InMemoryIdentityService, Orchestrator};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// The orchestrator wired to the in-memory stores the server runs on.
pub type AppOrchestrator =
    Orchestrator<InMemoryCatalogService, InMemoryStockLedger, InMemoryOrderJournal>;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub orchestrator: AppOrchestrator,
    pub catalog: InMemoryCatalogService,
    pub ledger: InMemoryStockLedger,
    pub journal: InMemoryOrderJournal,
    pub identity: InMemoryIdentityService,
}

/// Creates the default application state with in-memory stores and
/// consumed-service stand-ins.
pub fn create_default_state() -> Arc<AppState> {
    let catalog = InMemoryCatalogService::new();
    let ledger = InMemoryStockLedger::new();
    let journal = InMemoryOrderJournal::new();
    let identity = InMemoryIdentityService::new();

    let orchestrator = Orchestrator::new(catalog.clone(), ledger.clone(), journal.clone());

    Arc::new(AppState {
        orchestrator,
        catalog,
        ledger,
        journal,
        identity,
    })
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/orders",
            post(routes::orders::create).get(routes::orders::list),
        )
        .route("/orders/my-orders", get(routes::orders::my_orders))
        .route(
            "/orders/{id}",
            get(routes::orders::get).delete(routes::orders::delete),
        )
        .route("/orders/{id}/status", put(routes::orders::update_status))
        .route("/orders/{id}/cancel", put(routes::orders::cancel))
        .route(
            "/inventory",
            post(routes::inventory::provision).get(routes::inventory::list),
        )
        .route("/inventory/low-stock", get(routes::inventory::low_stock))
        .route(
            "/inventory/{product_id}",
            get(routes::inventory::get)
                .put(routes::inventory::adjust)
                .delete(routes::inventory::delete),
        )
        .route("/inventory/{product_id}/check", get(routes::inventory::check))
        .route(
            "/inventory/{product_id}/discount",
            post(routes::inventory::discount),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
