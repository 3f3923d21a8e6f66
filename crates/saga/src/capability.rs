//! Per-request capability derived once from the authenticated user.
//!
//! Handlers resolve the bearer token once, build a [`Capability`] and
//! pass it into the orchestrator; ownership and role checks are never
//! re-derived ad hoc inside individual operations.

use common::UserId;
use domain::Order;

use crate::services::AuthUser;

/// What the current requester is allowed to do.
#[derive(Debug, Clone)]
pub struct Capability {
    user_id: UserId,
    is_admin: bool,
}

impl Capability {
    /// Builds the capability for an authenticated user.
    pub fn for_user(user: &AuthUser) -> Self {
        Self {
            user_id: user.id.clone(),
            is_admin: user.role.is_admin(),
        }
    }

    /// The requesting user's ID.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns true for admin requesters.
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Returns true if the requester owns the order.
    pub fn owns(&self, order: &Order) -> bool {
        order.belongs_to(&self.user_id)
    }

    /// Reading and cancelling require ownership or the admin role.
    pub fn may_access(&self, order: &Order) -> bool {
        self.is_admin || self.owns(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Money, OrderItem, OwnerInfo};

    fn order_for(owner: &str) -> Order {
        Order::new(
            OwnerInfo::new(owner),
            vec![OrderItem::new("P1", "Widget", 1, Money::from_cents(100))],
            "123 Main Street, Springfield",
        )
        .unwrap()
    }

    #[test]
    fn test_owner_may_access_own_order() {
        let cap = Capability::for_user(&AuthUser::client("user-1", "u@example.com", "U"));
        assert!(cap.may_access(&order_for("user-1")));
        assert!(!cap.may_access(&order_for("user-2")));
        assert!(!cap.is_admin());
    }

    #[test]
    fn test_admin_may_access_any_order() {
        let cap = Capability::for_user(&AuthUser::admin("admin-1", "a@example.com", "A"));
        assert!(cap.may_access(&order_for("user-1")));
        assert!(cap.is_admin());
        assert!(!cap.owns(&order_for("user-1")));
    }
}
