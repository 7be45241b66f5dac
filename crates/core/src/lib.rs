pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod filters;
pub mod query;
pub mod ranking;
pub mod recommend;

pub use catalog::wire::decode_envelope;
pub use catalog::{
    CatalogMeta, CatalogProvider, CatalogSnapshot, QuarantinedRecord, StaticCatalogProvider,
    DEFAULT_CATEGORIES,
};
pub use domain::product::{Attribute, CategoryRef, Product, Sku, Variant};
pub use domain::query::{QueryOperation, QueryRequest, StockTier};
pub use errors::{AmountOverflow, CatalogError, InterfaceError};
pub use filters::classifier::{Classification, NeedClassifier, NeedRule};
pub use query::{
    BudgetRecommendation, CatalogQueryService, EmptyReason, ListingReport, QueryResponse,
    ShopperRecommendation,
};
pub use ranking::RankStrategy;
pub use recommend::{RecommendationReport, RecommendedProduct};
