//! Catalog lookup trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use domain::{Money, ProductId};

use super::ServiceUnavailable;

/// A product as reported by the catalog service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Catalog product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Current catalog price; snapshot into orders at creation time.
    pub price: Money,
    /// Whether the product may currently be purchased.
    pub active: bool,
}

impl Product {
    /// Creates an active product.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            active: true,
        }
    }

    /// Marks the product as inactive.
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Trait for product catalog lookups.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Looks up a product by ID. `None` means the catalog has no such
    /// product.
    async fn get_product(
        &self,
        product_id: &ProductId,
    ) -> Result<Option<Product>, ServiceUnavailable>;
}

#[derive(Debug, Default)]
struct CatalogState {
    products: HashMap<ProductId, Product>,
    unavailable: bool,
}

/// In-memory catalog for tests and the demo server.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogService {
    state: Arc<RwLock<CatalogState>>,
}

impl InMemoryCatalogService {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a product.
    pub fn add_product(&self, product: Product) {
        self.state
            .write()
            .unwrap()
            .products
            .insert(product.id.clone(), product);
    }

    /// Simulates the catalog being unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.write().unwrap().unavailable = unavailable;
    }
}

#[async_trait]
impl CatalogService for InMemoryCatalogService {
    async fn get_product(
        &self,
        product_id: &ProductId,
    ) -> Result<Option<Product>, ServiceUnavailable> {
        let state = self.state.read().unwrap();
        if state.unavailable {
            return Err(ServiceUnavailable::new("catalog", "connection refused"));
        }
        Ok(state.products.get(product_id).cloned())
    }
}
