//! The stock ledger trait.

use async_trait::async_trait;
use domain::ProductId;
use serde::{Deserialize, Serialize};

use crate::record::StockRecord;
use crate::status::StockStatus;
use crate::Result;

/// Result of a read-only availability check.
///
/// Checking does not reserve anything; callers that need the stock
/// must follow up with [`StockLedger::reserve`], which re-validates
/// atomically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockCheck {
    pub available: bool,
    pub current_stock: u32,
    pub status: StockStatus,
}

/// Manual stock adjustment direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustOperation {
    Add,
    Subtract,
}

/// Filter for listing stock records.
#[derive(Debug, Clone, Default)]
pub struct StockFilter {
    pub status: Option<StockStatus>,
    pub location: Option<String>,
}

/// Authoritative store of per-product quantity and derived status.
///
/// Every mutating operation is scoped to a single product and must be
/// executed as one atomic read-modify-write against that product's
/// record. Failures (`NotFound`, `InsufficientStock`) are reported to
/// the caller, never retried internally.
#[async_trait]
pub trait StockLedger: Send + Sync {
    /// Provisions a stock record for a product.
    ///
    /// One-time setup; fails with `AlreadyExists` for duplicates.
    async fn create(&self, record: StockRecord) -> Result<StockRecord>;

    /// Returns the stock record for a product, if any.
    async fn get(&self, product_id: &ProductId) -> Option<StockRecord>;

    /// Lists stock records matching the filter, in no particular order.
    async fn list(&self, filter: StockFilter) -> Vec<StockRecord>;

    /// Read-only availability check; does not reserve.
    async fn check(&self, product_id: &ProductId, quantity: u32) -> Result<StockCheck>;

    /// Atomically decrements stock if `quantity` units are available.
    ///
    /// This is the reserve-if-available operation: the sufficiency
    /// check and the decrement happen under the same critical section,
    /// so two concurrent reservations can never both take the last
    /// unit.
    async fn reserve(&self, product_id: &ProductId, quantity: u32) -> Result<StockRecord>;

    /// Atomically increments stock; used for compensation. Never fails
    /// on "too much".
    async fn restore(&self, product_id: &ProductId, quantity: u32) -> Result<StockRecord>;

    /// Manual stock correction: add or subtract a quantity.
    ///
    /// Subtract applies the same sufficiency guard as reserve.
    async fn adjust(
        &self,
        product_id: &ProductId,
        quantity: u32,
        operation: AdjustOperation,
    ) -> Result<StockRecord>;

    /// Returns records at or below their minimum threshold that are
    /// not yet out of stock.
    async fn low_stock(&self) -> Vec<StockRecord>;

    /// Removes the stock record for a product, returning it.
    async fn delete(&self, product_id: &ProductId) -> Result<StockRecord>;
}
