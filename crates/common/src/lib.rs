//! Shared identifier types used across the fulfillment crates.

mod types;

pub use types::{OrderId, UserId};
