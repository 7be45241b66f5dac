pub mod product;
pub mod query;

pub use product::{Attribute, CategoryRef, Product, Sku, Variant};
pub use query::{
    BrandCategoryParams, BudgetParams, CategoryParams, PriceRangeParams, QueryOperation,
    QueryRequest, SearchParams, ShopperParams, StockLevelParams, StockTier,
};
