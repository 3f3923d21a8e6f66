//! Order domain model.
//!
//! Contains the [`Order`] aggregate, its value objects and the order
//! status state machine. All mutation goes through the aggregate so the
//! derived invariants (non-empty items, total = Σ price × quantity,
//! legal status transitions) hold at all times.

pub mod order;

pub use order::{
    Money, Order, OrderError, OrderItem, OrderStatus, OwnerInfo, ProductId, Role,
};
