use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sku(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub name: String,
    pub price: Option<Decimal>,
    pub stock: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// One category assignment. Only the parent name of the first assignment is used for
/// matching; the leaf name is kept for renderers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub name: Option<String>,
    pub parent: Option<String>,
}

/// A validated catalog product. Instances are only built by the wire decoder, so the
/// price fields are non-negative and `featured` reflects a strict boolean `true`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub sku: Sku,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub vat_price: Option<Decimal>,
    pub stock: u32,
    pub brand: Option<String>,
    pub store: Option<String>,
    pub featured: bool,
    pub variants: Vec<Variant>,
    pub attributes: Vec<Attribute>,
    pub categories: Vec<CategoryRef>,
}

impl Product {
    /// VAT-inclusive price when the provider supplied one, otherwise the base price.
    pub fn effective_price(&self) -> Decimal {
        self.vat_price.unwrap_or(self.price)
    }

    pub fn primary_category(&self) -> Option<&str> {
        self.categories.first().and_then(|category| category.parent.as_deref())
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}
