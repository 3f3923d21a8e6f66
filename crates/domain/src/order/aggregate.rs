//! The Order aggregate.

use chrono::{DateTime, Utc};
use common::{OrderId, UserId};
use serde::{Deserialize, Serialize};

use super::{Money, OrderError, OrderItem, OrderStatus};

/// Minimum accepted shipping address length, in characters.
pub const MIN_ADDRESS_LEN: usize = 10;
/// Maximum accepted shipping address length, in characters.
pub const MAX_ADDRESS_LEN: usize = 500;

/// Snapshot of the ordering user taken at creation time, for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerInfo {
    pub id: UserId,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl OwnerInfo {
    /// Creates owner info with just a user ID.
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            email: None,
            name: None,
        }
    }

    /// Attaches the audit email/name snapshot.
    pub fn with_contact(
        mut self,
        email: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        self.email = Some(email.into());
        self.name = Some(name.into());
        self
    }
}

/// A purchase order.
///
/// The item list is fixed at creation; after that the only mutations
/// are status transitions and cancellation metadata, so the total
/// amount invariant (total = Σ price × quantity) is established once
/// in the constructor and can never drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    owner_id: UserId,
    owner_email: Option<String>,
    owner_name: Option<String>,
    items: Vec<OrderItem>,
    total_amount: Money,
    status: OrderStatus,
    shipping_address: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    cancelled_at: Option<DateTime<Utc>>,
    cancelled_by: Option<UserId>,
}

impl Order {
    /// Creates a new pending order.
    ///
    /// Validates that the order has at least one item, that every item
    /// has a positive quantity and non-negative price, and that the
    /// shipping address length is within bounds. The total amount is
    /// derived from the item snapshots.
    pub fn new(
        owner: OwnerInfo,
        items: Vec<OrderItem>,
        shipping_address: impl Into<String>,
    ) -> Result<Self, OrderError> {
        if items.is_empty() {
            return Err(OrderError::NoItems);
        }
        for item in &items {
            if item.quantity == 0 {
                return Err(OrderError::InvalidQuantity {
                    quantity: item.quantity,
                });
            }
            if item.unit_price.is_negative() {
                return Err(OrderError::InvalidPrice {
                    price: item.unit_price.cents(),
                });
            }
        }

        let shipping_address = shipping_address.into();
        let address_len = shipping_address.chars().count();
        if !(MIN_ADDRESS_LEN..=MAX_ADDRESS_LEN).contains(&address_len) {
            return Err(OrderError::InvalidShippingAddress {
                length: address_len,
            });
        }

        let total_amount = Self::total_of(&items);
        let now = Utc::now();

        Ok(Self {
            id: OrderId::new(),
            owner_id: owner.id,
            owner_email: owner.email,
            owner_name: owner.name,
            items,
            total_amount,
            status: OrderStatus::Pending,
            shipping_address,
            created_at: now,
            updated_at: now,
            cancelled_at: None,
            cancelled_by: None,
        })
    }

    fn total_of(items: &[OrderItem]) -> Money {
        let mut total = Money::zero();
        for item in items {
            total += item.total_price();
        }
        total
    }

    /// Transitions the order to a new status.
    ///
    /// Cancellation must go through [`Order::cancel`] so the audit
    /// fields are recorded.
    pub fn transition_to(&mut self, next: OrderStatus) -> Result<(), OrderError> {
        if !self.status.can_transition_to(next) {
            return Err(OrderError::InvalidStateTransition {
                current: self.status,
                requested: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Cancels the order, recording who cancelled it and when.
    pub fn cancel(&mut self, cancelled_by: UserId) -> Result<(), OrderError> {
        if !self.status.can_cancel() {
            return Err(OrderError::InvalidStateTransition {
                current: self.status,
                requested: OrderStatus::Cancelled,
            });
        }
        let now = Utc::now();
        self.status = OrderStatus::Cancelled;
        self.cancelled_at = Some(now);
        self.cancelled_by = Some(cancelled_by);
        self.updated_at = now;
        Ok(())
    }

    /// Returns true if the order belongs to the given user.
    pub fn belongs_to(&self, user_id: &UserId) -> bool {
        &self.owner_id == user_id
    }

    // -- Accessors --

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    pub fn owner_email(&self) -> Option<&str> {
        self.owner_email.as_deref()
    }

    pub fn owner_name(&self) -> Option<&str> {
        self.owner_name.as_deref()
    }

    /// Iterates over the order's items.
    pub fn items(&self) -> impl Iterator<Item = &OrderItem> {
        self.items.iter()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn shipping_address(&self) -> &str {
        &self.shipping_address
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn cancelled_at(&self) -> Option<DateTime<Utc>> {
        self.cancelled_at
    }

    pub fn cancelled_by(&self) -> Option<&UserId> {
        self.cancelled_by.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> OwnerInfo {
        OwnerInfo::new("user-1").with_contact("user@example.com", "Test User")
    }

    fn items() -> Vec<OrderItem> {
        vec![
            OrderItem::new("P1", "Widget", 2, Money::from_cents(1000)),
            OrderItem::new("P2", "Gadget", 1, Money::from_cents(2000)),
        ]
    }

    const ADDRESS: &str = "123 Main Street, Springfield";

    #[test]
    fn test_new_order_computes_total_from_items() {
        let order = Order::new(owner(), items(), ADDRESS).unwrap();
        assert_eq!(order.total_amount().cents(), 4000);
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.item_count(), 2);
        assert!(order.cancelled_at().is_none());
    }

    #[test]
    fn test_new_order_snapshots_owner_audit_info() {
        let order = Order::new(owner(), items(), ADDRESS).unwrap();
        assert!(order.belongs_to(&"user-1".into()));
        assert_eq!(order.owner_email(), Some("user@example.com"));
        assert_eq!(order.owner_name(), Some("Test User"));
    }

    #[test]
    fn test_empty_items_rejected() {
        let result = Order::new(owner(), vec![], ADDRESS);
        assert!(matches!(result, Err(OrderError::NoItems)));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let bad = vec![OrderItem::new("P1", "Widget", 0, Money::from_cents(100))];
        let result = Order::new(owner(), bad, ADDRESS);
        assert!(matches!(
            result,
            Err(OrderError::InvalidQuantity { quantity: 0 })
        ));
    }

    #[test]
    fn test_negative_price_rejected() {
        let bad = vec![OrderItem::new("P1", "Widget", 1, Money::from_cents(-5))];
        let result = Order::new(owner(), bad, ADDRESS);
        assert!(matches!(result, Err(OrderError::InvalidPrice { .. })));
    }

    #[test]
    fn test_shipping_address_length_bounds() {
        assert!(matches!(
            Order::new(owner(), items(), "too short"),
            Err(OrderError::InvalidShippingAddress { length: 9 })
        ));
        assert!(matches!(
            Order::new(owner(), items(), "x".repeat(501)),
            Err(OrderError::InvalidShippingAddress { length: 501 })
        ));
        assert!(Order::new(owner(), items(), "x".repeat(500)).is_ok());
    }

    #[test]
    fn test_transition_follows_state_machine() {
        let mut order = Order::new(owner(), items(), ADDRESS).unwrap();

        order.transition_to(OrderStatus::Paid).unwrap();
        order.transition_to(OrderStatus::Shipped).unwrap();
        order.transition_to(OrderStatus::Delivered).unwrap();

        let result = order.transition_to(OrderStatus::Cancelled);
        assert!(matches!(
            result,
            Err(OrderError::InvalidStateTransition {
                current: OrderStatus::Delivered,
                requested: OrderStatus::Cancelled,
            })
        ));
    }

    #[test]
    fn test_pending_can_skip_to_delivered() {
        let mut order = Order::new(owner(), items(), ADDRESS).unwrap();
        order.transition_to(OrderStatus::Delivered).unwrap();
        assert_eq!(order.status(), OrderStatus::Delivered);
    }

    #[test]
    fn test_cancel_records_audit_fields() {
        let mut order = Order::new(owner(), items(), ADDRESS).unwrap();
        order.cancel("admin-1".into()).unwrap();

        assert_eq!(order.status(), OrderStatus::Cancelled);
        assert!(order.cancelled_at().is_some());
        assert_eq!(order.cancelled_by(), Some(&"admin-1".into()));
    }

    #[test]
    fn test_cancel_twice_rejected() {
        let mut order = Order::new(owner(), items(), ADDRESS).unwrap();
        order.cancel("user-1".into()).unwrap();

        let result = order.cancel("user-1".into());
        assert!(matches!(
            result,
            Err(OrderError::InvalidStateTransition {
                current: OrderStatus::Cancelled,
                ..
            })
        ));
    }

    #[test]
    fn test_cancel_delivered_rejected() {
        let mut order = Order::new(owner(), items(), ADDRESS).unwrap();
        order.transition_to(OrderStatus::Delivered).unwrap();
        assert!(order.cancel("user-1".into()).is_err());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let order = Order::new(owner(), items(), ADDRESS).unwrap();
        let json = serde_json::to_string(&order).unwrap();
        let deserialized: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, deserialized);
    }
}
