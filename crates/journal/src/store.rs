//! The order journal trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{OrderId, UserId};
use domain::{Order, OrderStatus};

use crate::Result;

/// Filter for listing orders.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Restrict to orders owned by this user.
    pub owner: Option<UserId>,
    /// Restrict to orders in this status.
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    /// Filter for a single owner's orders.
    pub fn for_owner(owner: impl Into<UserId>) -> Self {
        Self {
            owner: Some(owner.into()),
            status: None,
        }
    }

    /// Adds a status restriction.
    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Persistent store of order aggregates.
#[async_trait]
pub trait OrderJournal: Send + Sync {
    /// Persists a new order.
    async fn insert(&self, order: Order) -> Result<Order>;

    /// Loads an order by ID.
    async fn get(&self, order_id: OrderId) -> Option<Order>;

    /// Replaces a stored order with an updated aggregate.
    async fn update(&self, order: Order) -> Result<Order>;

    /// Permanently removes an order.
    async fn delete(&self, order_id: OrderId) -> Result<Order>;

    /// Lists orders matching the filter, newest first.
    async fn list(&self, filter: OrderFilter) -> Vec<Order>;

    /// Deletes cancelled orders last touched before the cutoff.
    ///
    /// Retention support: only cancelled orders are eligible. Returns
    /// the number of orders purged.
    async fn purge_cancelled_before(&self, cutoff: DateTime<Utc>) -> usize;
}
