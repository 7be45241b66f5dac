use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Inventory buckets. Every non-negative stock quantity falls into exactly one tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockTier {
    OutOfStock,
    Low,
    Medium,
    High,
}

impl StockTier {
    pub const ALL: [StockTier; 4] =
        [StockTier::OutOfStock, StockTier::Low, StockTier::Medium, StockTier::High];

    /// Parses an exact wire label (`low`, `medium`, `high`, `out_of_stock`). Any other
    /// text, including other casings, yields `None` so callers can fail closed.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "out_of_stock" => Some(Self::OutOfStock),
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn for_stock(stock: u32) -> Self {
        match stock {
            0 => Self::OutOfStock,
            1..=20 => Self::Low,
            21..=50 => Self::Medium,
            _ => Self::High,
        }
    }

    pub fn contains(self, stock: u32) -> bool {
        Self::for_stock(stock) == self
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OutOfStock => "out_of_stock",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Heading used by marketplace listings.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::OutOfStock => "Tükenen Ürünler",
            Self::Low => "Düşük Stoklu Ürünler (1-20)",
            Self::Medium => "Orta Stoklu Ürünler (21-50)",
            Self::High => "Yüksek Stoklu Ürünler (50+)",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::OutOfStock => "🚫",
            Self::Low => "⚠️",
            Self::Medium => "📦",
            Self::High => "✅",
        }
    }

    pub fn range_hint(&self) -> &'static str {
        match self {
            Self::OutOfStock => "0",
            Self::Low => "1-20",
            Self::Medium => "21-50",
            Self::High => "51+",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueryOperation {
    ListAll,
    Search,
    ByCategory,
    ByPriceRange,
    ByStockLevel,
    ByBrandAndCategory,
    FeaturedOnly,
    BudgetRecommendation,
    PersonalShopper,
}

impl QueryOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListAll => "list-all",
            Self::Search => "search",
            Self::ByCategory => "by-category",
            Self::ByPriceRange => "by-price-range",
            Self::ByStockLevel => "by-stock-level",
            Self::ByBrandAndCategory => "by-brand-and-category",
            Self::FeaturedOnly => "featured-only",
            Self::BudgetRecommendation => "budget-recommendation",
            Self::PersonalShopper => "personal-shopper",
        }
    }
}

impl std::fmt::Display for QueryOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub query: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryParams {
    pub category: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRangeParams {
    pub min_price: Decimal,
    pub max_price: Decimal,
}

/// The label is kept as text: an unrecognized tier is a valid query that matches
/// nothing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLevelParams {
    pub stock_level: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandCategoryParams {
    pub brand: String,
    pub category: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetParams {
    pub budget: Decimal,
    #[serde(default)]
    pub category: Option<String>,
}

impl BudgetParams {
    /// Blank categories disable the category stage.
    pub fn category_filter(&self) -> Option<&str> {
        self.category.as_deref().map(str::trim).filter(|category| !category.is_empty())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopperParams {
    pub need: String,
    #[serde(default)]
    pub budget: Option<Decimal>,
}

/// A transport-neutral query, tagged by operation name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "kebab-case")]
pub enum QueryRequest {
    ListAll,
    Search(SearchParams),
    ByCategory(CategoryParams),
    ByPriceRange(PriceRangeParams),
    ByStockLevel(StockLevelParams),
    ByBrandAndCategory(BrandCategoryParams),
    FeaturedOnly,
    BudgetRecommendation(BudgetParams),
    PersonalShopper(ShopperParams),
}

impl QueryRequest {
    pub fn operation(&self) -> QueryOperation {
        match self {
            Self::ListAll => QueryOperation::ListAll,
            Self::Search(_) => QueryOperation::Search,
            Self::ByCategory(_) => QueryOperation::ByCategory,
            Self::ByPriceRange(_) => QueryOperation::ByPriceRange,
            Self::ByStockLevel(_) => QueryOperation::ByStockLevel,
            Self::ByBrandAndCategory(_) => QueryOperation::ByBrandAndCategory,
            Self::FeaturedOnly => QueryOperation::FeaturedOnly,
            Self::BudgetRecommendation(_) => QueryOperation::BudgetRecommendation,
            Self::PersonalShopper(_) => QueryOperation::PersonalShopper,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{BudgetParams, QueryOperation, QueryRequest, StockTier};

    #[test]
    fn stock_tiers_partition_stock_values() {
        for stock in 0..=500u32 {
            let matching = StockTier::ALL.iter().filter(|tier| tier.contains(stock)).count();
            assert_eq!(matching, 1, "stock {stock} must fall into exactly one tier");
        }
        assert_eq!(StockTier::for_stock(u32::MAX), StockTier::High);
    }

    #[test]
    fn stock_tier_boundaries() {
        assert!(StockTier::OutOfStock.contains(0));
        assert!(StockTier::Low.contains(1));
        assert!(StockTier::Low.contains(20));
        assert!(StockTier::Medium.contains(21));
        assert!(StockTier::Medium.contains(50));
        assert!(StockTier::High.contains(51));
    }

    #[test]
    fn unknown_stock_label_is_not_parsed() {
        assert_eq!(StockTier::parse("low"), Some(StockTier::Low));
        assert_eq!(StockTier::parse("out_of_stock"), Some(StockTier::OutOfStock));
        assert_eq!(StockTier::parse(" LOW "), None);
        assert_eq!(StockTier::parse("High"), None);
        assert_eq!(StockTier::parse("plenty"), None);
        assert_eq!(StockTier::parse(""), None);
    }

    #[test]
    fn query_request_decodes_tagged_json() {
        let request: QueryRequest = serde_json::from_str(
            r#"{"operation":"by-price-range","minPrice":100,"maxPrice":2500.5}"#,
        )
        .expect("price range request should decode");
        assert_eq!(request.operation(), QueryOperation::ByPriceRange);

        let listing: QueryRequest =
            serde_json::from_str(r#"{"operation":"list-all"}"#).expect("list-all should decode");
        assert_eq!(listing, QueryRequest::ListAll);

        let shopper: QueryRequest =
            serde_json::from_str(r#"{"operation":"personal-shopper","need":"hediye"}"#)
                .expect("shopper request should decode");
        assert!(matches!(shopper, QueryRequest::PersonalShopper(ref params) if params.budget.is_none()));
    }

    #[test]
    fn blank_budget_category_is_absent() {
        let params = BudgetParams { budget: Decimal::new(1000, 0), category: Some("  ".to_owned()) };
        assert_eq!(params.category_filter(), None);

        let params =
            BudgetParams { budget: Decimal::new(1000, 0), category: Some(" Mutfak ".to_owned()) };
        assert_eq!(params.category_filter(), Some("Mutfak"));
    }
}
