//! Per-product stock record.

use chrono::{DateTime, Utc};
use domain::ProductId;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::status::StockStatus;

/// Default minimum-stock threshold for newly provisioned records.
pub const DEFAULT_MIN_STOCK: u32 = 10;

/// Stock bookkeeping for a single product.
///
/// The quantity is unsigned, so it cannot go negative by construction;
/// a decrement that would exceed the current quantity is rejected and
/// leaves the record untouched. All quantity changes funnel through
/// [`StockRecord::set_quantity`], which recomputes the derived status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub min_stock: u32,
    pub location: Option<String>,
    pub status: StockStatus,
    pub last_restock_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StockRecord {
    /// Creates a new stock record for a product.
    pub fn new(
        product_id: impl Into<ProductId>,
        product_name: impl Into<String>,
        quantity: u32,
        min_stock: u32,
        location: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            product_id: product_id.into(),
            product_name: product_name.into(),
            quantity,
            min_stock,
            location,
            status: StockStatus::derive(quantity, min_stock),
            last_restock_date: now,
            updated_at: now,
        }
    }

    /// Returns true if at least `requested` units are in stock.
    pub fn has_at_least(&self, requested: u32) -> bool {
        self.quantity >= requested
    }

    /// Sets the quantity, recomputing the derived status.
    ///
    /// This is the single mutation entry point; reserve and restore are
    /// expressed in terms of it so the status can never go stale.
    fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.status = StockStatus::derive(quantity, self.min_stock);
        self.updated_at = Utc::now();
    }

    /// Decrements the quantity if sufficient stock is available.
    ///
    /// Fails with [`LedgerError::InsufficientStock`] without modifying
    /// the record when `requested` exceeds the current quantity.
    pub fn reserve(&mut self, requested: u32) -> Result<(), LedgerError> {
        if requested == 0 {
            return Err(LedgerError::InvalidQuantity {
                quantity: requested,
                reason: "must be greater than 0",
            });
        }
        if !self.has_at_least(requested) {
            return Err(LedgerError::InsufficientStock {
                product_id: self.product_id.clone(),
                available: self.quantity,
                requested,
            });
        }
        self.set_quantity(self.quantity - requested);
        Ok(())
    }

    /// Increments the quantity; there is no upper bound.
    ///
    /// Used for compensation and restocking, so it also bumps the
    /// restock date.
    pub fn restore(&mut self, amount: u32) {
        self.set_quantity(self.quantity.saturating_add(amount));
        self.last_restock_date = self.updated_at;
    }

    /// Returns true if the record is at or below its minimum threshold
    /// but not yet exhausted.
    pub fn is_low(&self) -> bool {
        self.status == StockStatus::LowStock
    }
}
