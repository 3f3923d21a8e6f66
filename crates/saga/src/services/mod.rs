//! Consumed external service interfaces: catalog and identity lookup.

pub mod catalog;
pub mod identity;

pub use catalog::{CatalogService, InMemoryCatalogService, Product};
pub use identity::{AuthUser, IdentityService, InMemoryIdentityService};

use thiserror::Error;

/// A collaborator service could not be reached or failed internally.
#[derive(Debug, Clone, Error)]
#[error("{service} unavailable: {message}")]
pub struct ServiceUnavailable {
    pub service: &'static str,
    pub message: String,
}

impl ServiceUnavailable {
    pub fn new(service: &'static str, message: impl Into<String>) -> Self {
        Self {
            service,
            message: message.into(),
        }
    }
}
