//! Saga progress record.
//!
//! Tracks which forward steps have been attempted and confirmed, plus
//! the per-product reservations that would need compensating if a
//! later step fails. The record lives in memory for the duration of
//! one `create_order` call; it is best-effort, not durable, so a
//! crashed process cannot resume a half-finished saga.

use domain::ProductId;
use serde::Serialize;

/// A forward step of the order creation saga.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SagaStep {
    /// Resolve catalog prices for every requested item.
    PriceItems,
    /// Build and validate the order aggregate.
    ValidateOrder,
    /// Read-only stock availability check.
    CheckStock,
    /// Atomic per-product stock reservation.
    ReserveStock,
    /// Persist the pending order to the journal.
    PersistOrder,
}

impl SagaStep {
    /// Returns the step name for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            SagaStep::PriceItems => "price_items",
            SagaStep::ValidateOrder => "validate_order",
            SagaStep::CheckStock => "check_stock",
            SagaStep::ReserveStock => "reserve_stock",
            SagaStep::PersistOrder => "persist_order",
        }
    }
}

impl std::fmt::Display for SagaStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Finite-state record of a running saga.
#[derive(Debug, Clone, Default)]
pub struct SagaProgress {
    attempted: Vec<SagaStep>,
    confirmed: Vec<SagaStep>,
    reservations: Vec<(ProductId, u32)>,
}

impl SagaProgress {
    /// Creates an empty progress record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that a step has started.
    pub fn begin(&mut self, step: SagaStep) {
        tracing::debug!(step = %step, "saga step started");
        self.attempted.push(step);
    }

    /// Records that a step finished successfully.
    pub fn confirm(&mut self, step: SagaStep) {
        self.confirmed.push(step);
    }

    /// Records a stock reservation made during [`SagaStep::ReserveStock`].
    pub fn record_reservation(&mut self, product_id: ProductId, quantity: u32) {
        self.reservations.push((product_id, quantity));
    }

    /// Steps attempted so far, in order.
    pub fn attempted(&self) -> &[SagaStep] {
        &self.attempted
    }

    /// Steps confirmed so far, in order.
    pub fn confirmed(&self) -> &[SagaStep] {
        &self.confirmed
    }

    /// The step currently in flight, if one started without confirming.
    pub fn in_flight(&self) -> Option<SagaStep> {
        let step = *self.attempted.last()?;
        (self.confirmed.last() != Some(&step)).then_some(step)
    }

    /// Reservations needing compensation, most recent first.
    pub fn reservations_to_undo(&self) -> impl Iterator<Item = &(ProductId, u32)> {
        self.reservations.iter().rev()
    }

    /// Returns true if any stock has been reserved.
    pub fn has_reservations(&self) -> bool {
        !self.reservations.is_empty()
    }
}
