//! Ledger error types.

use domain::ProductId;
use thiserror::Error;

/// Errors that can occur during stock ledger operations.
///
/// `NotFound` and `InsufficientStock` are always reported to the
/// caller; the ledger never retries on its own.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    /// No stock record exists for the product.
    #[error("No stock record for product {product_id}")]
    NotFound { product_id: ProductId },

    /// A stock record already exists for the product.
    #[error("Stock record already exists for product {product_id}")]
    AlreadyExists { product_id: ProductId },

    /// The requested quantity exceeds the current stock.
    #[error(
        "Insufficient stock for product {product_id}: available {available}, requested {requested}"
    )]
    InsufficientStock {
        product_id: ProductId,
        available: u32,
        requested: u32,
    },

    /// The requested quantity is not usable for this operation.
    #[error("Invalid quantity {quantity}: {reason}")]
    InvalidQuantity { quantity: u32, reason: &'static str },
}
