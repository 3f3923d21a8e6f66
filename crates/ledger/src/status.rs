//! Derived stock availability status.

use serde::{Deserialize, Serialize};

/// Availability of a product, derived from its quantity.
///
/// The status is a pure function of `(quantity, min_stock)` and is
/// never set directly; [`StockStatus::derive`] is the only source of
/// truth and is applied on every quantity mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    /// Quantity is above the minimum threshold.
    Available,

    /// Quantity is positive but at or below the minimum threshold.
    LowStock,

    /// Quantity is zero.
    OutOfStock,
}

impl StockStatus {
    /// Derives the status from a quantity and minimum threshold.
    pub fn derive(quantity: u32, min_stock: u32) -> Self {
        if quantity == 0 {
            StockStatus::OutOfStock
        } else if quantity <= min_stock {
            StockStatus::LowStock
        } else {
            StockStatus::Available
        }
    }

    /// Returns the wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            StockStatus::Available => "available",
            StockStatus::LowStock => "low_stock",
            StockStatus::OutOfStock => "out_of_stock",
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StockStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(StockStatus::Available),
            "low_stock" => Ok(StockStatus::LowStock),
            "out_of_stock" => Ok(StockStatus::OutOfStock),
            other => Err(format!("unknown stock status: {other}")),
        }
    }
}
