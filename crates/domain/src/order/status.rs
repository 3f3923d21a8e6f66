//! Order status state machine.

use serde::{Deserialize, Serialize};

/// The status of an order in its lifecycle.
///
/// Allowed transitions:
/// ```text
/// pending ──► paid ──► shipped ──► delivered
///    │          │          │
///    └──────────┴──────────┴─────► cancelled
/// ```
/// `pending` may also skip directly to any later status. `delivered`
/// and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order has been placed and stock reserved; awaiting payment.
    #[default]
    Pending,

    /// Payment received.
    Paid,

    /// Order handed to the carrier.
    Shipped,

    /// Order delivered to the customer (terminal).
    Delivered,

    /// Order was cancelled and its stock restored (terminal).
    Cancelled,
}

impl OrderStatus {
    /// Returns true if the state machine permits moving to `next`.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::{Cancelled, Delivered, Paid, Pending, Shipped};
        match self {
            Pending => matches!(next, Paid | Shipped | Delivered | Cancelled),
            Paid => matches!(next, Shipped | Delivered | Cancelled),
            Shipped => matches!(next, Delivered | Cancelled),
            Delivered | Cancelled => false,
        }
    }

    /// Returns true if the order can still be cancelled.
    pub fn can_cancel(self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if this is a terminal status (no further transitions).
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Returns the wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "paid" => Ok(OrderStatus::Paid),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}
