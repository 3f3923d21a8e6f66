//! In-memory stock ledger implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use domain::ProductId;
use tokio::sync::RwLock;

use crate::error::LedgerError;
use crate::record::StockRecord;
use crate::store::{AdjustOperation, StockCheck, StockFilter, StockLedger};
use crate::Result;

/// In-memory stock ledger.
///
/// A single `RwLock` over the record map gives each operation the
/// required per-product atomicity: reserve/restore hold the write
/// guard across the whole read-modify-write.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStockLedger {
    records: Arc<RwLock<HashMap<ProductId, StockRecord>>>,
}

impl InMemoryStockLedger {
    /// Creates a new empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stock records.
    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl StockLedger for InMemoryStockLedger {
    async fn create(&self, record: StockRecord) -> Result<StockRecord> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.product_id) {
            return Err(LedgerError::AlreadyExists {
                product_id: record.product_id.clone(),
            });
        }
        records.insert(record.product_id.clone(), record.clone());
        tracing::info!(product_id = %record.product_id, quantity = record.quantity, "stock record created");
        Ok(record)
    }

    async fn get(&self, product_id: &ProductId) -> Option<StockRecord> {
        self.records.read().await.get(product_id).cloned()
    }

    async fn list(&self, filter: StockFilter) -> Vec<StockRecord> {
        self.records
            .read()
            .await
            .values()
            .filter(|r| {
                if let Some(status) = filter.status
                    && r.status != status
                {
                    return false;
                }
                if let Some(ref location) = filter.location
                    && r.location.as_deref() != Some(location.as_str())
                {
                    return false;
                }
                true
            })
            .cloned()
            .collect()
    }

    async fn check(&self, product_id: &ProductId, quantity: u32) -> Result<StockCheck> {
        let records = self.records.read().await;
        let record = records.get(product_id).ok_or_else(|| LedgerError::NotFound {
            product_id: product_id.clone(),
        })?;

        Ok(StockCheck {
            available: record.has_at_least(quantity),
            current_stock: record.quantity,
            status: record.status,
        })
    }

    async fn reserve(&self, product_id: &ProductId, quantity: u32) -> Result<StockRecord> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(product_id)
            .ok_or_else(|| LedgerError::NotFound {
                product_id: product_id.clone(),
            })?;

        record.reserve(quantity)?;
        tracing::debug!(
            product_id = %product_id,
            reserved = quantity,
            remaining = record.quantity,
            "stock reserved"
        );
        Ok(record.clone())
    }

    async fn restore(&self, product_id: &ProductId, quantity: u32) -> Result<StockRecord> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(product_id)
            .ok_or_else(|| LedgerError::NotFound {
                product_id: product_id.clone(),
            })?;

        record.restore(quantity);
        tracing::debug!(
            product_id = %product_id,
            restored = quantity,
            current = record.quantity,
            "stock restored"
        );
        Ok(record.clone())
    }

    async fn adjust(
        &self,
        product_id: &ProductId,
        quantity: u32,
        operation: AdjustOperation,
    ) -> Result<StockRecord> {
        match operation {
            AdjustOperation::Add => self.restore(product_id, quantity).await,
            AdjustOperation::Subtract => self.reserve(product_id, quantity).await,
        }
    }

    async fn low_stock(&self) -> Vec<StockRecord> {
        self.records
            .read()
            .await
            .values()
            .filter(|r| r.is_low())
            .cloned()
            .collect()
    }

    async fn delete(&self, product_id: &ProductId) -> Result<StockRecord> {
        let mut records = self.records.write().await;
        records
            .remove(product_id)
            .ok_or_else(|| LedgerError::NotFound {
                product_id: product_id.clone(),
            })
    }
}
