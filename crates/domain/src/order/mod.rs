//! Order aggregate and related types.

mod aggregate;
mod status;
mod value_objects;

pub use aggregate::{Order, OwnerInfo};
pub use status::OrderStatus;
pub use value_objects::{Money, OrderItem, ProductId, Role};

use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Order has no items.
    #[error("Order must contain at least one item")]
    NoItems,

    /// Invalid quantity.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// Invalid price.
    #[error("Invalid price: {price} cents (must not be negative)")]
    InvalidPrice { price: i64 },

    /// Shipping address outside the accepted length range.
    #[error("Invalid shipping address: {length} characters (must be between 10 and 500)")]
    InvalidShippingAddress { length: usize },

    /// Requested status transition is not allowed by the state machine.
    #[error("Invalid state transition: {current} -> {requested}")]
    InvalidStateTransition {
        current: OrderStatus,
        requested: OrderStatus,
    },
}
