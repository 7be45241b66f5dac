//! Decoding of the provider's paged envelope into validated products.
//!
//! The envelope itself must be a JSON object with an `items` array; anything else is a
//! bad response. Items are decoded one at a time so a malformed record is quarantined
//! instead of failing the whole snapshot.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::{CatalogMeta, CatalogSnapshot, QuarantinedRecord};
use crate::domain::product::{Attribute, CategoryRef, Product, Sku, Variant};
use crate::errors::CatalogError;

#[derive(Debug, Deserialize)]
struct WireEnvelope {
    #[serde(default)]
    items: Option<Vec<Value>>,
    #[serde(default)]
    meta: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireProduct {
    sku: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    price: Decimal,
    #[serde(default)]
    vat_price: Option<Decimal>,
    #[serde(default)]
    stock: Option<u32>,
    #[serde(default)]
    brand: Option<WireNamed>,
    #[serde(default)]
    store: Option<WireNamed>,
    #[serde(default)]
    is_featured: Option<Value>,
    // Field name emitted by the current marketplace API.
    #[serde(default, rename = "isFeature")]
    is_feature: Option<Value>,
    #[serde(default)]
    variants: Option<Vec<WireVariant>>,
    #[serde(default)]
    attributes: Option<Vec<WireAttribute>>,
    #[serde(default)]
    categories: Option<Vec<WireCategoryEntry>>,
}

#[derive(Debug, Default, Deserialize)]
struct WireNamed {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireVariant {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    price: Option<Decimal>,
    #[serde(default)]
    stock: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct WireAttribute {
    name: String,
    #[serde(default)]
    value: Value,
}

#[derive(Debug, Deserialize)]
struct WireCategoryEntry {
    #[serde(default)]
    category: Option<WireCategory>,
}

#[derive(Debug, Deserialize)]
struct WireCategory {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    parent: Option<WireNamed>,
}

pub fn decode_envelope(body: &[u8]) -> Result<CatalogSnapshot, CatalogError> {
    let envelope: WireEnvelope = serde_json::from_slice(body)
        .map_err(|error| CatalogError::bad_body(format!("response is not a JSON envelope: {error}")))?;

    let items = envelope
        .items
        .ok_or_else(|| CatalogError::bad_body("response has no `items` collection"))?;

    let meta = envelope.meta.and_then(|raw| serde_json::from_value::<CatalogMeta>(raw).ok());

    let mut products = Vec::with_capacity(items.len());
    let mut quarantined = Vec::new();
    for (index, raw) in items.into_iter().enumerate() {
        match decode_product(index, raw) {
            Ok(product) => products.push(product),
            Err(record) => {
                warn!(
                    event_name = "catalog.provider.quarantined",
                    index = record.index,
                    sku = record.sku.as_deref().unwrap_or("unknown"),
                    reason = %record.reason,
                    "malformed catalog record excluded from snapshot"
                );
                quarantined.push(record);
            }
        }
    }

    Ok(CatalogSnapshot { products, meta, quarantined })
}

fn decode_product(index: usize, raw: Value) -> Result<Product, QuarantinedRecord> {
    let sku = raw.get("sku").and_then(Value::as_str).map(str::to_owned);
    let reject = |reason: String| QuarantinedRecord { index, sku: sku.clone(), reason };

    let wire: WireProduct =
        serde_json::from_value(raw).map_err(|error| reject(error.to_string()))?;

    check_price("price", wire.price).map_err(&reject)?;
    if let Some(vat_price) = wire.vat_price {
        check_price("vatPrice", vat_price).map_err(&reject)?;
    }

    let featured = is_strict_true(wire.is_featured.as_ref()) || is_strict_true(wire.is_feature.as_ref());

    Ok(Product {
        sku: Sku(wire.sku),
        name: wire.name,
        description: wire.description.unwrap_or_default(),
        price: wire.price,
        vat_price: wire.vat_price,
        stock: wire.stock.unwrap_or(0),
        brand: wire.brand.and_then(|brand| brand.name),
        store: wire.store.and_then(|store| store.name),
        featured,
        variants: wire
            .variants
            .unwrap_or_default()
            .into_iter()
            .map(|variant| Variant {
                name: variant.name.unwrap_or_default(),
                price: variant.price,
                stock: variant.stock.unwrap_or(0),
            })
            .collect(),
        attributes: wire
            .attributes
            .unwrap_or_default()
            .into_iter()
            .map(|attribute| Attribute { name: attribute.name, value: attribute_text(attribute.value) })
            .collect(),
        categories: wire
            .categories
            .unwrap_or_default()
            .into_iter()
            .map(|entry| match entry.category {
                Some(category) => CategoryRef {
                    name: category.name,
                    parent: category.parent.and_then(|parent| parent.name),
                },
                None => CategoryRef::default(),
            })
            .collect(),
    })
}

/// Upper bound on a single amount; totals of a few picks stay far inside `Decimal`.
const MAX_PRICE_UNITS: i64 = 1_000_000_000_000;

fn check_price(field: &str, value: Decimal) -> Result<(), String> {
    if value < Decimal::ZERO {
        return Err(format!("negative {field} {value}"));
    }
    if value > Decimal::new(MAX_PRICE_UNITS, 0) {
        return Err(format!("{field} {value} exceeds {MAX_PRICE_UNITS}"));
    }
    Ok(())
}

fn is_strict_true(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Bool(true)))
}

fn attribute_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
