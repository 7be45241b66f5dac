//! Pure product predicates. Text comparisons are case-insensitive substring matches.

use rust_decimal::Decimal;

use crate::domain::product::Product;
use crate::domain::query::StockTier;

pub(crate) fn fold(text: &str) -> String {
    text.to_lowercase()
}

fn contains_folded(haystack: &str, folded_needle: &str) -> bool {
    fold(haystack).contains(folded_needle)
}

pub fn matches_text(product: &Product, query: &str) -> bool {
    let query = fold(query);
    contains_folded(&product.name, &query)
        || contains_folded(&product.description, &query)
        || product.brand.as_deref().is_some_and(|brand| contains_folded(brand, &query))
}

/// Products without a resolvable primary category never match.
pub fn matches_category(product: &Product, category: &str) -> bool {
    let category = fold(category);
    product.primary_category().is_some_and(|primary| contains_folded(primary, &category))
}

pub fn matches_brand(product: &Product, brand: &str) -> bool {
    let brand = fold(brand);
    product.brand.as_deref().is_some_and(|name| contains_folded(name, &brand))
}

pub fn in_price_range(product: &Product, min: Decimal, max: Decimal) -> bool {
    let price = product.effective_price();
    price >= min && price <= max
}

pub fn matches_stock_tier(product: &Product, tier: StockTier) -> bool {
    tier.contains(product.stock)
}

/// Unrecognized labels match nothing.
pub fn matches_stock_level(product: &Product, label: &str) -> bool {
    StockTier::parse(label).is_some_and(|tier| matches_stock_tier(product, tier))
}

pub fn matches_brand_and_category(product: &Product, brand: &str, category: &str) -> bool {
    matches_brand(product, brand) && matches_category(product, category)
}

pub fn is_featured(product: &Product) -> bool {
    product.featured
}

pub fn is_affordable(product: &Product, budget: Decimal) -> bool {
    product.effective_price() <= budget
}

/// Copies the products satisfying `predicate` into a new candidate set, keeping
/// their relative order.
pub fn select<F>(products: &[Product], predicate: F) -> Vec<Product>
where
    F: Fn(&Product) -> bool,
{
    products.iter().filter(|&product| predicate(product)).cloned().collect()
}
