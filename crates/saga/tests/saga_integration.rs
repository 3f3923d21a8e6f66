//! Failure-path and concurrency tests for the order saga.
//!
//! The flaky wrappers delegate to the in-memory stores but can be told
//! to fail or stall specific operations, which is how compensation and
//! deadline behavior get exercised.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::OrderId;
use domain::{Money, Order, OrderStatus, ProductId};
use journal::{InMemoryOrderJournal, JournalError, OrderFilter, OrderJournal};
use ledger::{
    AdjustOperation, InMemoryStockLedger, LedgerError, StockCheck, StockFilter, StockLedger,
    StockRecord,
};
use saga::{
    AuthUser, Capability, InMemoryCatalogService, Orchestrator, OrderRequestItem, Product,
    SagaError,
};

const ADDRESS: &str = "123 Main Street, Springfield";

fn client() -> AuthUser {
    AuthUser::client("user-1", "user@example.com", "User One")
}

fn request(product_id: &str, quantity: u32) -> OrderRequestItem {
    OrderRequestItem {
        product_id: product_id.into(),
        quantity,
    }
}

#[derive(Debug, Clone, Default)]
struct LedgerFaults {
    fail_reserve_for: Option<ProductId>,
    fail_restore: bool,
    delay: Option<Duration>,
}

/// Stock ledger that can be told to fail or stall specific operations.
#[derive(Debug, Clone)]
struct FlakyLedger {
    inner: InMemoryStockLedger,
    faults: Arc<RwLock<LedgerFaults>>,
}

impl FlakyLedger {
    fn new(inner: InMemoryStockLedger) -> Self {
        Self {
            inner,
            faults: Arc::new(RwLock::new(LedgerFaults::default())),
        }
    }

    fn fail_reserve_for(&self, product_id: &str) {
        self.faults.write().unwrap().fail_reserve_for = Some(product_id.into());
    }

    fn fail_restores(&self) {
        self.faults.write().unwrap().fail_restore = true;
    }

    fn stall(&self, delay: Duration) {
        self.faults.write().unwrap().delay = Some(delay);
    }

    async fn apply_delay(&self) {
        let delay = self.faults.read().unwrap().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl StockLedger for FlakyLedger {
    async fn create(&self, record: StockRecord) -> ledger::Result<StockRecord> {
        self.inner.create(record).await
    }

    async fn get(&self, product_id: &ProductId) -> Option<StockRecord> {
        self.inner.get(product_id).await
    }

    async fn list(&self, filter: StockFilter) -> Vec<StockRecord> {
        self.inner.list(filter).await
    }

    async fn check(&self, product_id: &ProductId, quantity: u32) -> ledger::Result<StockCheck> {
        self.apply_delay().await;
        self.inner.check(product_id, quantity).await
    }

    async fn reserve(&self, product_id: &ProductId, quantity: u32) -> ledger::Result<StockRecord> {
        self.apply_delay().await;
        let fail_for = self.faults.read().unwrap().fail_reserve_for.clone();
        if fail_for.as_ref() == Some(product_id) {
            return Err(LedgerError::InsufficientStock {
                product_id: product_id.clone(),
                available: 0,
                requested: quantity,
            });
        }
        self.inner.reserve(product_id, quantity).await
    }

    async fn restore(&self, product_id: &ProductId, quantity: u32) -> ledger::Result<StockRecord> {
        if self.faults.read().unwrap().fail_restore {
            return Err(LedgerError::NotFound {
                product_id: product_id.clone(),
            });
        }
        self.inner.restore(product_id, quantity).await
    }

    async fn adjust(
        &self,
        product_id: &ProductId,
        quantity: u32,
        operation: AdjustOperation,
    ) -> ledger::Result<StockRecord> {
        self.inner.adjust(product_id, quantity, operation).await
    }

    async fn low_stock(&self) -> Vec<StockRecord> {
        self.inner.low_stock().await
    }

    async fn delete(&self, product_id: &ProductId) -> ledger::Result<StockRecord> {
        self.inner.delete(product_id).await
    }
}

/// Order journal whose inserts can be made to fail.
#[derive(Debug, Clone)]
struct FlakyJournal {
    inner: InMemoryOrderJournal,
    fail_insert: Arc<AtomicBool>,
}

impl FlakyJournal {
    fn new(inner: InMemoryOrderJournal) -> Self {
        Self {
            inner,
            fail_insert: Arc::new(AtomicBool::new(false)),
        }
    }

    fn fail_inserts(&self) {
        self.fail_insert.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl OrderJournal for FlakyJournal {
    async fn insert(&self, order: Order) -> journal::Result<Order> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(JournalError::Storage("write refused".to_string()));
        }
        self.inner.insert(order).await
    }

    async fn get(&self, order_id: OrderId) -> Option<Order> {
        self.inner.get(order_id).await
    }

    async fn update(&self, order: Order) -> journal::Result<Order> {
        self.inner.update(order).await
    }

    async fn delete(&self, order_id: OrderId) -> journal::Result<Order> {
        self.inner.delete(order_id).await
    }

    async fn list(&self, filter: OrderFilter) -> Vec<Order> {
        self.inner.list(filter).await
    }

    async fn purge_cancelled_before(&self, cutoff: DateTime<Utc>) -> usize {
        self.inner.purge_cancelled_before(cutoff).await
    }
}

struct Harness {
    orchestrator: Orchestrator<InMemoryCatalogService, FlakyLedger, FlakyJournal>,
    catalog: InMemoryCatalogService,
    ledger: FlakyLedger,
    journal: FlakyJournal,
}

async fn harness() -> Harness {
    let catalog = InMemoryCatalogService::new();
    catalog.add_product(Product::new("P1", "Widget", Money::from_cents(1000)));
    catalog.add_product(Product::new("P2", "Gadget", Money::from_cents(2000)));

    let ledger = FlakyLedger::new(InMemoryStockLedger::new());
    ledger
        .create(StockRecord::new("P1", "Widget", 5, 2, None))
        .await
        .unwrap();
    ledger
        .create(StockRecord::new("P2", "Gadget", 3, 1, None))
        .await
        .unwrap();

    let journal = FlakyJournal::new(InMemoryOrderJournal::new());
    let orchestrator = Orchestrator::new(catalog.clone(), ledger.clone(), journal.clone());
    Harness {
        orchestrator,
        catalog,
        ledger,
        journal,
    }
}

async fn quantity_of(ledger: &FlakyLedger, product_id: &str) -> u32 {
    ledger.get(&product_id.into()).await.unwrap().quantity
}

#[tokio::test]
async fn test_reserve_failure_rolls_back_prior_reservations() {
    let h = harness().await;
    h.ledger.fail_reserve_for("P2");

    let result = h
        .orchestrator
        .create_order(
            &client(),
            vec![request("P1", 2), request("P2", 1)],
            ADDRESS.to_string(),
        )
        .await;

    assert!(matches!(result, Err(SagaError::InsufficientStock { .. })));
    // P1's reservation was compensated; P2 was never decremented.
    assert_eq!(quantity_of(&h.ledger, "P1").await, 5);
    assert_eq!(quantity_of(&h.ledger, "P2").await, 3);
    assert_eq!(h.journal.inner.order_count().await, 0);
}

#[tokio::test]
async fn test_journal_failure_rolls_back_all_reservations() {
    let h = harness().await;
    h.journal.fail_inserts();

    let result = h
        .orchestrator
        .create_order(
            &client(),
            vec![request("P1", 2), request("P2", 1)],
            ADDRESS.to_string(),
        )
        .await;

    assert!(matches!(
        result,
        Err(SagaError::Journal(JournalError::Storage(_)))
    ));
    assert_eq!(quantity_of(&h.ledger, "P1").await, 5);
    assert_eq!(quantity_of(&h.ledger, "P2").await, 3);
}

#[tokio::test]
async fn test_cancel_with_failing_restore_still_cancels_with_warnings() {
    let h = harness().await;
    let order = h
        .orchestrator
        .create_order(&client(), vec![request("P1", 2)], ADDRESS.to_string())
        .await
        .unwrap();
    h.ledger.fail_restores();

    let cancelled = h
        .orchestrator
        .cancel_order(order.id(), &Capability::for_user(&client()))
        .await
        .unwrap();

    assert_eq!(cancelled.order.status(), OrderStatus::Cancelled);
    assert_eq!(cancelled.stock_warnings.len(), 1);
    assert_eq!(cancelled.stock_warnings[0].product_id.as_str(), "P1");
    assert_eq!(cancelled.stock_warnings[0].quantity, 2);
    // The restore never happened, which is exactly what the warning is
    // telling operators to reconcile.
    assert_eq!(quantity_of(&h.ledger, "P1").await, 3);

    let stored = h.journal.get(order.id()).await.unwrap();
    assert_eq!(stored.status(), OrderStatus::Cancelled);
}

#[tokio::test]
async fn test_slow_ledger_hits_call_deadline() {
    let h = harness().await;
    h.ledger.stall(Duration::from_millis(200));
    let orchestrator = h
        .orchestrator
        .clone()
        .with_call_timeout(Duration::from_millis(20));

    let result = orchestrator
        .create_order(&client(), vec![request("P1", 1)], ADDRESS.to_string())
        .await;

    assert!(matches!(
        result,
        Err(SagaError::DependencyTimeout { service: "ledger" })
    ));
    assert_eq!(h.journal.inner.order_count().await, 0);
}

#[tokio::test]
async fn test_unavailable_catalog_fails_before_side_effects() {
    let h = harness().await;
    h.catalog.set_unavailable(true);

    let result = h
        .orchestrator
        .create_order(&client(), vec![request("P1", 1)], ADDRESS.to_string())
        .await;

    assert!(matches!(result, Err(SagaError::Dependency(_))));
    assert_eq!(quantity_of(&h.ledger, "P1").await, 5);
    assert_eq!(h.journal.inner.order_count().await, 0);
}

#[tokio::test]
async fn test_concurrent_orders_for_last_unit_cannot_oversell() {
    let catalog = InMemoryCatalogService::new();
    catalog.add_product(Product::new("P1", "Widget", Money::from_cents(1000)));
    let ledger = InMemoryStockLedger::new();
    ledger
        .create(StockRecord::new("P1", "Widget", 1, 1, None))
        .await
        .unwrap();
    let journal = InMemoryOrderJournal::new();
    let orchestrator = Arc::new(Orchestrator::new(catalog, ledger.clone(), journal.clone()));

    let a = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move {
            orchestrator
                .create_order(&client(), vec![request("P1", 1)], ADDRESS.to_string())
                .await
        })
    };
    let b = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move {
            let other = AuthUser::client("user-2", "other@example.com", "Other");
            orchestrator
                .create_order(&other, vec![request("P1", 1)], ADDRESS.to_string())
                .await
        })
    };

    let (ra, rb) = (a.await.unwrap(), b.await.unwrap());
    assert!(
        ra.is_ok() ^ rb.is_ok(),
        "exactly one order may take the last unit"
    );
    let loser = if ra.is_err() { ra } else { rb };
    assert!(matches!(loser, Err(SagaError::InsufficientStock { .. })));

    assert_eq!(ledger.get(&"P1".into()).await.unwrap().quantity, 0);
    assert_eq!(journal.order_count().await, 1);
}

#[tokio::test]
async fn test_repeated_create_cancel_preserves_stock_totals() {
    let h = harness().await;
    let cap = Capability::for_user(&client());

    for _ in 0..4 {
        let order = h
            .orchestrator
            .create_order(
                &client(),
                vec![request("P1", 3), request("P2", 2)],
                ADDRESS.to_string(),
            )
            .await
            .unwrap();
        h.orchestrator.cancel_order(order.id(), &cap).await.unwrap();
    }

    assert_eq!(quantity_of(&h.ledger, "P1").await, 5);
    assert_eq!(quantity_of(&h.ledger, "P2").await, 3);
}
