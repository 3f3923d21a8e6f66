//! The order fulfillment orchestrator.
//!
//! `create_order` runs a forward-only sequence of steps (price the
//! items, validate the aggregate, check stock, reserve stock, persist
//! the order) and compensates already-made reservations when a later
//! step fails, so a failed order never leaves stock decremented. There
//! is no distributed transaction; consistency comes from the atomic
//! per-product reserve plus best-effort compensation.
//!
//! Every call to a collaborator is bounded by a deadline so one slow
//! dependency cannot hang a request indefinitely.

use std::future::Future;
use std::time::{Duration, Instant};

use common::OrderId;
use domain::{Order, OrderItem, OrderStatus, OwnerInfo, ProductId};
use journal::{OrderFilter, OrderJournal};
use ledger::{AdjustOperation, LedgerError, StockLedger, StockRecord, DEFAULT_MIN_STOCK};
use serde::{Deserialize, Serialize};

use crate::capability::Capability;
use crate::error::SagaError;
use crate::progress::{SagaProgress, SagaStep};
use crate::services::{AuthUser, CatalogService};
use crate::Result;

/// Default deadline for a single collaborator call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// One line of an order request, before catalog pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequestItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A stock restoration that failed during cancellation.
///
/// Cancellation still succeeds; the warning tells operators which
/// product needs manual reconciliation.
#[derive(Debug, Clone, Serialize)]
pub struct StockWarning {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub error: String,
}

/// Outcome of a successful cancellation.
///
/// Serializes as the order itself, with a `stock_warnings` field only
/// when some restores failed.
#[derive(Debug, Clone, Serialize)]
pub struct CancelledOrder {
    #[serde(flatten)]
    pub order: Order,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stock_warnings: Vec<StockWarning>,
}

/// Coordinates the catalog, stock ledger and order journal.
#[derive(Debug, Clone)]
pub struct Orchestrator<C, L, J> {
    catalog: C,
    ledger: L,
    journal: J,
    call_timeout: Duration,
}

impl<C, L, J> Orchestrator<C, L, J>
where
    C: CatalogService,
    L: StockLedger,
    J: OrderJournal,
{
    /// Creates an orchestrator with the default call deadline.
    pub fn new(catalog: C, ledger: L, journal: J) -> Self {
        Self {
            catalog,
            ledger,
            journal,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Overrides the per-call deadline.
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Runs a fallible collaborator call under the deadline.
    async fn bounded<T, E>(
        &self,
        service: &'static str,
        fut: impl Future<Output = std::result::Result<T, E>> + Send,
    ) -> Result<T>
    where
        SagaError: From<E>,
    {
        match tokio::time::timeout(self.call_timeout, fut).await {
            Ok(result) => result.map_err(SagaError::from),
            Err(_) => Err(SagaError::DependencyTimeout { service }),
        }
    }

    /// Runs an infallible collaborator call under the deadline.
    async fn bounded_ok<T>(
        &self,
        service: &'static str,
        fut: impl Future<Output = T> + Send,
    ) -> Result<T> {
        tokio::time::timeout(self.call_timeout, fut)
            .await
            .map_err(|_| SagaError::DependencyTimeout { service })
    }

    // -- Order operations --

    /// Creates an order for the authenticated user.
    ///
    /// Prices come from the catalog at call time, never from the
    /// request. On any failure after stock has been reserved, the
    /// reservations are rolled back before the error is returned.
    #[tracing::instrument(skip(self, owner, items), fields(user_id = %owner.id, item_count = items.len()))]
    pub async fn create_order(
        &self,
        owner: &AuthUser,
        items: Vec<OrderRequestItem>,
        shipping_address: String,
    ) -> Result<Order> {
        let started = Instant::now();
        let result = self.run_create(owner, items, shipping_address).await;
        metrics::histogram!("order_saga_duration_seconds").record(started.elapsed().as_secs_f64());

        match &result {
            Ok(order) => {
                metrics::counter!("orders_created_total").increment(1);
                tracing::info!(
                    order_id = %order.id(),
                    total_cents = order.total_amount().cents(),
                    "order created"
                );
            }
            Err(error) => {
                metrics::counter!("orders_failed_total").increment(1);
                tracing::warn!(error = %error, "order creation failed");
            }
        }
        result
    }

    async fn run_create(
        &self,
        owner: &AuthUser,
        items: Vec<OrderRequestItem>,
        shipping_address: String,
    ) -> Result<Order> {
        let mut progress = SagaProgress::new();
        let result = self
            .try_create(owner, items, shipping_address, &mut progress)
            .await;
        if result.is_err() {
            self.compensate(&progress).await;
        }
        result
    }

    async fn try_create(
        &self,
        owner: &AuthUser,
        items: Vec<OrderRequestItem>,
        shipping_address: String,
        progress: &mut SagaProgress,
    ) -> Result<Order> {
        progress.begin(SagaStep::PriceItems);
        let mut priced = Vec::with_capacity(items.len());
        for item in &items {
            let product = self
                .bounded("catalog", self.catalog.get_product(&item.product_id))
                .await?
                .ok_or_else(|| SagaError::ProductNotFound {
                    product_id: item.product_id.clone(),
                })?;
            if !product.active {
                return Err(SagaError::ProductInactive {
                    product_id: product.id,
                    name: product.name,
                });
            }
            priced.push(OrderItem::new(
                product.id,
                product.name,
                item.quantity,
                product.price,
            ));
        }
        progress.confirm(SagaStep::PriceItems);

        // Build the aggregate before touching stock so validation
        // failures have no side effects to undo.
        progress.begin(SagaStep::ValidateOrder);
        let order_owner =
            OwnerInfo::new(owner.id.clone()).with_contact(owner.email.clone(), owner.name.clone());
        let order = Order::new(order_owner, priced, shipping_address)?;
        progress.confirm(SagaStep::ValidateOrder);

        progress.begin(SagaStep::CheckStock);
        for item in order.items() {
            let check = match self
                .bounded("ledger", self.ledger.check(&item.product_id, item.quantity))
                .await
            {
                Ok(check) => check,
                Err(SagaError::Ledger(LedgerError::NotFound { product_id })) => {
                    return Err(SagaError::StockNotProvisioned { product_id });
                }
                Err(error) => return Err(error),
            };
            if !check.available {
                return Err(SagaError::InsufficientStock {
                    product_id: item.product_id.clone(),
                    product_name: item.product_name.clone(),
                    available: check.current_stock,
                    requested: item.quantity,
                });
            }
        }
        progress.confirm(SagaStep::CheckStock);

        // The check above is advisory; the reserve re-validates under
        // the ledger's critical section, so a concurrent order racing
        // for the same units surfaces here.
        progress.begin(SagaStep::ReserveStock);
        for item in order.items() {
            let record = match self
                .bounded(
                    "ledger",
                    self.ledger.reserve(&item.product_id, item.quantity),
                )
                .await
            {
                Ok(record) => record,
                Err(SagaError::Ledger(LedgerError::InsufficientStock {
                    available,
                    requested,
                    ..
                })) => {
                    return Err(SagaError::InsufficientStock {
                        product_id: item.product_id.clone(),
                        product_name: item.product_name.clone(),
                        available,
                        requested,
                    });
                }
                Err(error) => return Err(error),
            };
            progress.record_reservation(item.product_id.clone(), item.quantity);
            if record.is_low() {
                tracing::warn!(
                    product_id = %record.product_id,
                    quantity = record.quantity,
                    min_stock = record.min_stock,
                    "stock low after reservation"
                );
            }
        }
        progress.confirm(SagaStep::ReserveStock);

        progress.begin(SagaStep::PersistOrder);
        let order = self.bounded("journal", self.journal.insert(order)).await?;
        progress.confirm(SagaStep::PersistOrder);

        Ok(order)
    }

    /// Restores every reservation recorded so far, most recent first.
    ///
    /// Best-effort: a failed restore is logged for manual
    /// reconciliation and does not stop the remaining restores.
    async fn compensate(&self, progress: &SagaProgress) {
        if !progress.has_reservations() {
            return;
        }
        let failed_step = progress
            .in_flight()
            .map(SagaStep::as_str)
            .unwrap_or("unknown");
        metrics::counter!("saga_compensations_total").increment(1);
        tracing::warn!(step = failed_step, "order saga failed, restoring reserved stock");

        for (product_id, quantity) in progress.reservations_to_undo() {
            match self
                .bounded("ledger", self.ledger.restore(product_id, *quantity))
                .await
            {
                Ok(_) => {
                    tracing::info!(%product_id, quantity, "reserved stock restored");
                }
                Err(error) => {
                    tracing::error!(
                        %product_id,
                        quantity,
                        error = %error,
                        "failed to restore reserved stock; manual reconciliation required"
                    );
                }
            }
        }
    }

    /// Loads an order, enforcing ownership.
    #[tracing::instrument(skip(self, capability), fields(user_id = %capability.user_id()))]
    pub async fn get_order(&self, order_id: OrderId, capability: &Capability) -> Result<Order> {
        let order = self.load_order(order_id).await?;
        if !capability.may_access(&order) {
            return Err(SagaError::Forbidden("you do not have access to this order"));
        }
        Ok(order)
    }

    /// Lists orders: all of them for admins, own orders otherwise.
    pub async fn list_orders(
        &self,
        capability: &Capability,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>> {
        let mut filter = if capability.is_admin() {
            OrderFilter::default()
        } else {
            OrderFilter::for_owner(capability.user_id().clone())
        };
        filter.status = status;
        self.bounded_ok("journal", self.journal.list(filter)).await
    }

    /// Lists the requester's own orders regardless of role.
    pub async fn my_orders(
        &self,
        capability: &Capability,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>> {
        let mut filter = OrderFilter::for_owner(capability.user_id().clone());
        filter.status = status;
        self.bounded_ok("journal", self.journal.list(filter)).await
    }

    /// Cancels an order and restores its reserved stock.
    ///
    /// The cancellability check runs before any stock is touched, so an
    /// already-terminal order cannot inflate stock. Restores that fail
    /// are reported as warnings rather than failing the cancellation.
    #[tracing::instrument(skip(self, capability), fields(user_id = %capability.user_id()))]
    pub async fn cancel_order(
        &self,
        order_id: OrderId,
        capability: &Capability,
    ) -> Result<CancelledOrder> {
        let mut order = self.load_order(order_id).await?;
        if !order.status().can_cancel() {
            return Err(SagaError::Order(domain::OrderError::InvalidStateTransition {
                current: order.status(),
                requested: OrderStatus::Cancelled,
            }));
        }
        if !capability.may_access(&order) {
            return Err(SagaError::Forbidden("you cannot cancel this order"));
        }

        let mut stock_warnings = Vec::new();
        for item in order.items() {
            if let Err(error) = self
                .bounded(
                    "ledger",
                    self.ledger.restore(&item.product_id, item.quantity),
                )
                .await
            {
                tracing::error!(
                    order_id = %order.id(),
                    product_id = %item.product_id,
                    quantity = item.quantity,
                    error = %error,
                    "failed to restore stock during cancellation"
                );
                stock_warnings.push(StockWarning {
                    product_id: item.product_id.clone(),
                    product_name: item.product_name.clone(),
                    quantity: item.quantity,
                    error: error.to_string(),
                });
            }
        }

        order.cancel(capability.user_id().clone())?;
        let order = self.bounded("journal", self.journal.update(order)).await?;

        metrics::counter!("orders_cancelled_total").increment(1);
        tracing::info!(
            order_id = %order.id(),
            warnings = stock_warnings.len(),
            "order cancelled"
        );
        Ok(CancelledOrder {
            order,
            stock_warnings,
        })
    }

    /// Moves an order along the status state machine. Admin only.
    ///
    /// Cancellation is rejected here because it has stock side effects
    /// that only [`Orchestrator::cancel_order`] performs.
    #[tracing::instrument(skip(self, capability), fields(user_id = %capability.user_id()))]
    pub async fn update_status(
        &self,
        order_id: OrderId,
        next: OrderStatus,
        capability: &Capability,
    ) -> Result<Order> {
        if !capability.is_admin() {
            return Err(SagaError::Forbidden("only admins can update order status"));
        }
        if next == OrderStatus::Cancelled {
            return Err(SagaError::CancelViaStatusUpdate);
        }
        let mut order = self.load_order(order_id).await?;
        order.transition_to(next)?;
        self.bounded("journal", self.journal.update(order)).await
    }

    /// Permanently removes a cancelled order from the journal.
    #[tracing::instrument(skip(self, capability), fields(user_id = %capability.user_id()))]
    pub async fn delete_order(&self, order_id: OrderId, capability: &Capability) -> Result<Order> {
        let order = self.load_order(order_id).await?;
        if !capability.may_access(&order) {
            return Err(SagaError::Forbidden("you cannot delete this order"));
        }
        if order.status() != OrderStatus::Cancelled {
            return Err(SagaError::OrderNotPurgeable {
                status: order.status(),
            });
        }
        self.bounded("journal", self.journal.delete(order_id)).await
    }

    async fn load_order(&self, order_id: OrderId) -> Result<Order> {
        self.bounded_ok("journal", self.journal.get(order_id))
            .await?
            .ok_or(SagaError::OrderNotFound(order_id))
    }

    // -- Stock operations --

    /// Provisions a stock record for a catalog product. Admin only.
    ///
    /// The product must exist in the catalog; its name is snapshot into
    /// the record so stock listings are readable without a catalog
    /// round-trip.
    #[tracing::instrument(skip(self, capability), fields(user_id = %capability.user_id()))]
    pub async fn provision_stock(
        &self,
        capability: &Capability,
        product_id: ProductId,
        quantity: u32,
        min_stock: Option<u32>,
        location: Option<String>,
    ) -> Result<StockRecord> {
        if !capability.is_admin() {
            return Err(SagaError::Forbidden("only admins can manage stock"));
        }
        let product = self
            .bounded("catalog", self.catalog.get_product(&product_id))
            .await?
            .ok_or(SagaError::ProductNotFound { product_id })?;

        let record = StockRecord::new(
            product.id,
            product.name,
            quantity,
            min_stock.unwrap_or(DEFAULT_MIN_STOCK),
            location,
        );
        self.bounded("ledger", self.ledger.create(record)).await
    }

    /// Manually corrects a stock quantity. Admin only.
    #[tracing::instrument(skip(self, capability), fields(user_id = %capability.user_id()))]
    pub async fn adjust_stock(
        &self,
        capability: &Capability,
        product_id: ProductId,
        quantity: u32,
        operation: AdjustOperation,
    ) -> Result<StockRecord> {
        if !capability.is_admin() {
            return Err(SagaError::Forbidden("only admins can manage stock"));
        }
        self.bounded("ledger", self.ledger.adjust(&product_id, quantity, operation))
            .await
    }

    /// Removes a stock record. Admin only.
    ///
    /// Refused while any non-terminal order still references the
    /// product, because cancelling such an order would try to restore
    /// into a record that no longer exists.
    #[tracing::instrument(skip(self, capability), fields(user_id = %capability.user_id()))]
    pub async fn delete_stock(
        &self,
        capability: &Capability,
        product_id: ProductId,
    ) -> Result<StockRecord> {
        if !capability.is_admin() {
            return Err(SagaError::Forbidden("only admins can manage stock"));
        }
        let open_orders = self
            .bounded_ok("journal", self.journal.list(OrderFilter::default()))
            .await?
            .iter()
            .filter(|order| {
                !order.status().is_terminal()
                    && order.items().any(|item| item.product_id == product_id)
            })
            .count();
        if open_orders > 0 {
            return Err(SagaError::StockInUse {
                product_id,
                open_orders,
            });
        }
        self.bounded("ledger", self.ledger.delete(&product_id)).await
    }
}
