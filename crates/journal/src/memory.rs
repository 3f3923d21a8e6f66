//! In-memory order journal implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::OrderId;
use domain::{Order, OrderStatus};
use tokio::sync::RwLock;

use crate::error::JournalError;
use crate::store::{OrderFilter, OrderJournal};
use crate::Result;

/// In-memory order journal.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderJournal {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderJournal {
    /// Creates a new empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl OrderJournal for InMemoryOrderJournal {
    async fn insert(&self, order: Order) -> Result<Order> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id()) {
            return Err(JournalError::AlreadyExists(order.id()));
        }
        orders.insert(order.id(), order.clone());
        tracing::info!(order_id = %order.id(), owner = %order.owner_id(), "order persisted");
        Ok(order)
    }

    async fn get(&self, order_id: OrderId) -> Option<Order> {
        self.orders.read().await.get(&order_id).cloned()
    }

    async fn update(&self, order: Order) -> Result<Order> {
        let mut orders = self.orders.write().await;
        if !orders.contains_key(&order.id()) {
            return Err(JournalError::NotFound(order.id()));
        }
        orders.insert(order.id(), order.clone());
        Ok(order)
    }

    async fn delete(&self, order_id: OrderId) -> Result<Order> {
        let mut orders = self.orders.write().await;
        orders
            .remove(&order_id)
            .ok_or(JournalError::NotFound(order_id))
    }

    async fn list(&self, filter: OrderFilter) -> Vec<Order> {
        let orders = self.orders.read().await;
        let mut matched: Vec<Order> = orders
            .values()
            .filter(|o| {
                if let Some(ref owner) = filter.owner
                    && !o.belongs_to(owner)
                {
                    return false;
                }
                if let Some(status) = filter.status
                    && o.status() != status
                {
                    return false;
                }
                true
            })
            .cloned()
            .collect();

        matched.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        matched
    }

    async fn purge_cancelled_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut orders = self.orders.write().await;
        let before = orders.len();
        orders.retain(|_, o| {
            !(o.status() == OrderStatus::Cancelled && o.updated_at() < cutoff)
        });
        before - orders.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use domain::{Money, OrderItem, OwnerInfo};

    fn order_for(owner: &str) -> Order {
        Order::new(
            OwnerInfo::new(owner),
            vec![OrderItem::new("P1", "Widget", 1, Money::from_cents(1000))],
            "123 Main Street, Springfield",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let journal = InMemoryOrderJournal::new();
        let order = journal.insert(order_for("user-1")).await.unwrap();

        let found = journal.get(order.id()).await.unwrap();
        assert_eq!(found.id(), order.id());
    }

    #[tokio::test]
    async fn test_insert_duplicate_rejected() {
        let journal = InMemoryOrderJournal::new();
        let order = journal.insert(order_for("user-1")).await.unwrap();

        let result = journal.insert(order).await;
        assert!(matches!(result, Err(JournalError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let journal = InMemoryOrderJournal::new();
        assert!(journal.get(OrderId::new()).await.is_none());
    }

    #[tokio::test]
    async fn test_update_roundtrip() {
        let journal = InMemoryOrderJournal::new();
        let mut order = journal.insert(order_for("user-1")).await.unwrap();

        order.transition_to(OrderStatus::Paid).unwrap();
        journal.update(order.clone()).await.unwrap();

        let found = journal.get(order.id()).await.unwrap();
        assert_eq!(found.status(), OrderStatus::Paid);
    }

    #[tokio::test]
    async fn test_update_missing_rejected() {
        let journal = InMemoryOrderJournal::new();
        let order = order_for("user-1");
        let result = journal.update(order).await;
        assert!(matches!(result, Err(JournalError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete() {
        let journal = InMemoryOrderJournal::new();
        let order = journal.insert(order_for("user-1")).await.unwrap();

        journal.delete(order.id()).await.unwrap();
        assert!(journal.get(order.id()).await.is_none());
        assert!(matches!(
            journal.delete(order.id()).await,
            Err(JournalError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_filters_by_owner_and_status() {
        let journal = InMemoryOrderJournal::new();
        journal.insert(order_for("user-1")).await.unwrap();
        journal.insert(order_for("user-1")).await.unwrap();
        let mut cancelled = order_for("user-2");
        cancelled.cancel("user-2".into()).unwrap();
        journal.insert(cancelled).await.unwrap();

        let all = journal.list(OrderFilter::default()).await;
        assert_eq!(all.len(), 3);

        let mine = journal.list(OrderFilter::for_owner("user-1")).await;
        assert_eq!(mine.len(), 2);

        let cancelled = journal
            .list(OrderFilter::default().with_status(OrderStatus::Cancelled))
            .await;
        assert_eq!(cancelled.len(), 1);

        let none = journal
            .list(OrderFilter::for_owner("user-1").with_status(OrderStatus::Cancelled))
            .await;
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let journal = InMemoryOrderJournal::new();
        let first = journal.insert(order_for("user-1")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = journal.insert(order_for("user-1")).await.unwrap();

        let listed = journal.list(OrderFilter::default()).await;
        assert_eq!(listed[0].id(), second.id());
        assert_eq!(listed[1].id(), first.id());
    }

    #[tokio::test]
    async fn test_purge_only_touches_aged_cancelled_orders() {
        let journal = InMemoryOrderJournal::new();
        journal.insert(order_for("user-1")).await.unwrap();
        let mut cancelled = order_for("user-2");
        cancelled.cancel("user-2".into()).unwrap();
        journal.insert(cancelled).await.unwrap();

        // Cutoff in the past: nothing is old enough.
        let purged = journal
            .purge_cancelled_before(Utc::now() - Duration::days(30))
            .await;
        assert_eq!(purged, 0);

        // Cutoff in the future: the cancelled order goes, pending stays.
        let purged = journal
            .purge_cancelled_before(Utc::now() + Duration::seconds(1))
            .await;
        assert_eq!(purged, 1);
        assert_eq!(journal.order_count().await, 1);
    }
}
