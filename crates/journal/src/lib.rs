//! Order journal: the persisted store of order aggregates.
//!
//! The journal is a plain document store; the status state machine is
//! enforced by the [`domain::Order`] aggregate before anything reaches
//! it. Includes retention support for purging aged cancelled orders.

pub mod error;
pub mod memory;
pub mod store;

pub use error::JournalError;
pub use memory::InMemoryOrderJournal;
pub use store::{OrderFilter, OrderJournal};

/// Convenience type alias for journal results.
pub type Result<T> = std::result::Result<T, JournalError>;
