//! Stock ledger: the authoritative store of per-product quantity.
//!
//! Every quantity change goes through a single mutation entry point on
//! [`StockRecord`], which recomputes the derived availability status,
//! and each [`StockLedger`] operation is an atomic read-modify-write
//! scoped to one product. The reserve operation is a conditional
//! decrement guarded by stock sufficiency, so concurrent orders for the
//! same product cannot oversell.

pub mod error;
pub mod memory;
pub mod record;
pub mod status;
pub mod store;

pub use error::LedgerError;
pub use memory::InMemoryStockLedger;
pub use record::{StockRecord, DEFAULT_MIN_STOCK};
pub use status::StockStatus;
pub use store::{AdjustOperation, StockCheck, StockFilter, StockLedger};

/// Convenience type alias for ledger results.
pub type Result<T> = std::result::Result<T, LedgerError>;
