//! Saga error types.

use common::OrderId;
use domain::{OrderError, OrderStatus, ProductId};
use journal::JournalError;
use ledger::LedgerError;
use thiserror::Error;

use crate::services::ServiceUnavailable;

/// Errors that can occur during saga operations.
#[derive(Debug, Error)]
pub enum SagaError {
    /// A requested product does not exist in the catalog.
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: ProductId },

    /// A requested product exists but is not purchasable.
    #[error("Product \"{name}\" is not available for purchase")]
    ProductInactive { product_id: ProductId, name: String },

    /// A product exists in the catalog but was never provisioned in
    /// the stock ledger.
    #[error("Product {product_id} has no stock record")]
    StockNotProvisioned { product_id: ProductId },

    /// Cancellation must go through the cancel operation so stock is
    /// restored and audit fields are recorded.
    #[error("Use the cancel operation to cancel an order")]
    CancelViaStatusUpdate,

    /// A requested product lacks sufficient stock.
    #[error(
        "Insufficient stock for \"{product_name}\": available {available}, requested {requested}"
    )]
    InsufficientStock {
        product_id: ProductId,
        product_name: String,
        available: u32,
        requested: u32,
    },

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The requester lacks permission for the operation.
    #[error("Forbidden: {0}")]
    Forbidden(&'static str),

    /// Permanent deletion is only allowed for cancelled orders.
    #[error("Only cancelled orders can be deleted (current status: {status})")]
    OrderNotPurgeable { status: OrderStatus },

    /// The stock record is still referenced by open orders.
    #[error("Stock record for {product_id} is referenced by {open_orders} open order(s)")]
    StockInUse {
        product_id: ProductId,
        open_orders: usize,
    },

    /// Domain validation or state machine error.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Stock ledger error.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Order journal error.
    #[error(transparent)]
    Journal(#[from] JournalError),

    /// A collaborator did not answer within the call deadline.
    #[error("Dependency timeout: {service} did not respond within the deadline")]
    DependencyTimeout { service: &'static str },

    /// A collaborator failed outright.
    #[error(transparent)]
    Dependency(#[from] ServiceUnavailable),
}
