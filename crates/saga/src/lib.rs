//! Order fulfillment saga.
//!
//! The orchestrator coordinates three independently-owned stores — the
//! product catalog (consumed), the stock ledger and the order journal —
//! without a shared transaction. Order creation runs as a sequence of
//! forward steps (price, validate, reserve, persist) with compensating
//! stock restores when a later step fails; cancellation reverses the
//! reservation and degrades to a warning-carrying success when
//! compensation partially fails.

pub mod capability;
pub mod error;
pub mod orchestrator;
pub mod progress;
pub mod services;

pub use capability::Capability;
pub use error::SagaError;
pub use orchestrator::{CancelledOrder, Orchestrator, OrderRequestItem, StockWarning};
pub use progress::{SagaProgress, SagaStep};
pub use services::{
    AuthUser, CatalogService, IdentityService, InMemoryCatalogService, InMemoryIdentityService,
    Product, ServiceUnavailable,
};

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;
