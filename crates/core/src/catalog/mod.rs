pub mod wire;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::product::Product;
use crate::errors::CatalogError;

/// Categories the marketplace advertises when a snapshot carries none of its own.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Telefon",
    "Bilgisayar",
    "Giyilebilir Teknoloji",
    "Mutfak",
    "Mobilya",
    "Erkek Giyim",
    "Kadın Giyim",
    "TV & Ses Sistemleri",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogMeta {
    pub page: u64,
    pub pages: u64,
    pub total: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarantinedRecord {
    pub index: usize,
    pub sku: Option<String>,
    pub reason: String,
}

/// One fetch worth of products. Queries read the snapshot and never mutate it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    pub products: Vec<Product>,
    pub meta: Option<CatalogMeta>,
    pub quarantined: Vec<QuarantinedRecord>,
}

impl CatalogSnapshot {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products, meta: None, quarantined: Vec::new() }
    }

    /// Distinct primary categories in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for category in self.products.iter().filter_map(Product::primary_category) {
            if !seen.iter().any(|known| known == category) {
                seen.push(category.to_owned());
            }
        }
        seen
    }

    pub fn known_categories(&self) -> Vec<String> {
        let present = self.categories();
        if present.is_empty() {
            DEFAULT_CATEGORIES.iter().map(|category| (*category).to_owned()).collect()
        } else {
            present
        }
    }
}

/// Source of the full product collection. Each call is one atomic attempt.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn fetch(&self) -> Result<CatalogSnapshot, CatalogError>;
}

#[async_trait]
impl<T> CatalogProvider for Box<T>
where
    T: CatalogProvider + ?Sized,
{
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn fetch(&self) -> Result<CatalogSnapshot, CatalogError> {
        (**self).fetch().await
    }
}

/// Serves a fixed snapshot, or a fixed failure.
#[derive(Clone, Debug)]
pub struct StaticCatalogProvider {
    outcome: Result<CatalogSnapshot, CatalogError>,
}

impl StaticCatalogProvider {
    pub fn new(products: Vec<Product>) -> Self {
        Self { outcome: Ok(CatalogSnapshot::new(products)) }
    }

    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Self {
        Self { outcome: Ok(snapshot) }
    }

    pub fn failing(error: CatalogError) -> Self {
        Self { outcome: Err(error) }
    }
}

#[async_trait]
impl CatalogProvider for StaticCatalogProvider {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn fetch(&self) -> Result<CatalogSnapshot, CatalogError> {
        self.outcome.clone()
    }
}
