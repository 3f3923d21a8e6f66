//! Journal error types.

use common::OrderId;
use thiserror::Error;

/// Errors that can occur during order journal operations.
#[derive(Debug, Clone, Error)]
pub enum JournalError {
    /// No order exists with the given ID.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// An order with the same ID is already stored.
    #[error("Order already exists: {0}")]
    AlreadyExists(OrderId),

    /// The backing store failed to complete the operation.
    #[error("Journal storage failure: {0}")]
    Storage(String),
}
