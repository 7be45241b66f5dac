//! The catalog query service: one provider fetch per query, then pure in-memory
//! evaluation of the requested operation against that snapshot.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::{CatalogMeta, CatalogProvider, CatalogSnapshot};
use crate::domain::product::Product;
use crate::domain::query::{
    BrandCategoryParams, BudgetParams, CategoryParams, PriceRangeParams, QueryOperation,
    QueryRequest, SearchParams, ShopperParams, StockLevelParams, StockTier,
};
use crate::errors::CatalogError;
use crate::filters::classifier::{NeedClassifier, NeedRule};
use crate::filters::predicates::{
    in_price_range, is_featured, matches_brand_and_category, matches_category, matches_stock_tier,
    matches_text, select,
};
use crate::ranking::{rank, RankStrategy};
use crate::recommend::{recommend_for_budget, recommend_for_need, RecommendationReport};

/// Why a successful query produced nothing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EmptyReason {
    NoProducts,
    NoSearchMatches { query: String },
    UnknownCategory { category: String, available: Vec<String> },
    NoPriceRangeMatches { min_price: Decimal, max_price: Decimal },
    NoStockTierMatches { tier: StockTier },
    UnrecognizedStockLevel { label: String },
    NoBrandCategoryMatches { brand: String, category: String },
    NoFeaturedProducts,
    NothingWithinBudget { budget: Decimal, category: Option<String> },
    NoNeedMatches { need: String, rule: NeedRule },
}

impl EmptyReason {
    pub fn message(&self) -> String {
        match self {
            Self::NoProducts => "The catalog returned no products.".to_owned(),
            Self::NoSearchMatches { query } => format!("No products match \"{query}\"."),
            Self::UnknownCategory { category, available } => format!(
                "No products found in category \"{category}\". Available categories: {}.",
                available.join(", ")
            ),
            Self::NoPriceRangeMatches { min_price, max_price } => {
                format!("No products priced between {min_price} and {max_price}.")
            }
            Self::NoStockTierMatches { tier: StockTier::OutOfStock } => {
                "No depleted products: every listed item is in stock.".to_owned()
            }
            Self::NoStockTierMatches { tier } => {
                format!("No products in the {} stock tier ({}).", tier.as_str(), tier.range_hint())
            }
            Self::UnrecognizedStockLevel { label } => format!(
                "Unrecognized stock level \"{label}\"; expected one of low, medium, high, out_of_stock."
            ),
            Self::NoBrandCategoryMatches { brand, category } => {
                format!("No {brand} products found in category \"{category}\".")
            }
            Self::NoFeaturedProducts => "No featured products are currently listed.".to_owned(),
            Self::NothingWithinBudget { budget, category: Some(category) } => {
                format!("No in-stock products in \"{category}\" fit a budget of {budget}.")
            }
            Self::NothingWithinBudget { budget, category: None } => {
                format!("No in-stock products fit a budget of {budget}.")
            }
            Self::NoNeedMatches { need, .. } => {
                format!("No in-stock products match the need \"{need}\".")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingReport {
    pub operation: QueryOperation,
    pub products: Vec<Product>,
    pub total_matched: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_tier: Option<StockTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<CatalogMeta>,
    pub quarantined: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty_reason: Option<EmptyReason>,
}

impl ListingReport {
    fn new(
        operation: QueryOperation,
        snapshot: &CatalogSnapshot,
        products: Vec<Product>,
        empty_reason: impl FnOnce() -> EmptyReason,
    ) -> Self {
        let empty_reason = products.is_empty().then(empty_reason);
        Self {
            operation,
            total_matched: products.len(),
            products,
            stock_tier: None,
            meta: snapshot.meta,
            quarantined: snapshot.quarantined.len(),
            empty_reason,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetRecommendation {
    pub budget: Decimal,
    pub category: Option<String>,
    pub report: RecommendationReport,
    pub quarantined: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty_reason: Option<EmptyReason>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopperRecommendation {
    pub need: String,
    pub budget: Option<Decimal>,
    pub rule: NeedRule,
    pub matched_keyword: Option<String>,
    pub report: RecommendationReport,
    pub quarantined: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty_reason: Option<EmptyReason>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryResponse {
    Listing(ListingReport),
    Budget(BudgetRecommendation),
    Shopper(ShopperRecommendation),
}

impl QueryResponse {
    pub fn empty_reason(&self) -> Option<&EmptyReason> {
        match self {
            Self::Listing(report) => report.empty_reason.as_ref(),
            Self::Budget(recommendation) => recommendation.empty_reason.as_ref(),
            Self::Shopper(recommendation) => recommendation.empty_reason.as_ref(),
        }
    }
}

trait MatchCount {
    fn match_count(&self) -> usize;
}

impl MatchCount for ListingReport {
    fn match_count(&self) -> usize {
        self.total_matched
    }
}

impl MatchCount for BudgetRecommendation {
    fn match_count(&self) -> usize {
        self.report.ranked_top_n.len()
    }
}

impl MatchCount for ShopperRecommendation {
    fn match_count(&self) -> usize {
        self.report.ranked_top_n.len()
    }
}

impl MatchCount for QueryResponse {
    fn match_count(&self) -> usize {
        match self {
            Self::Listing(report) => report.match_count(),
            Self::Budget(recommendation) => recommendation.match_count(),
            Self::Shopper(recommendation) => recommendation.match_count(),
        }
    }
}

pub fn new_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

pub struct CatalogQueryService<P> {
    provider: P,
    classifier: NeedClassifier,
}

impl<P> CatalogQueryService<P>
where
    P: CatalogProvider,
{
    pub fn new(provider: P) -> Self {
        Self::with_classifier(provider, NeedClassifier::default())
    }

    pub fn with_classifier(provider: P, classifier: NeedClassifier) -> Self {
        Self { provider, classifier }
    }

    pub async fn list_all(&self) -> Result<ListingReport, CatalogError> {
        self.run(QueryOperation::ListAll, &new_correlation_id(), |snapshot| Ok(list_all(snapshot)))
            .await
    }

    pub async fn search(&self, params: &SearchParams) -> Result<ListingReport, CatalogError> {
        self.run(QueryOperation::Search, &new_correlation_id(), |snapshot| {
            Ok(search(snapshot, params))
        })
        .await
    }

    pub async fn by_category(&self, params: &CategoryParams) -> Result<ListingReport, CatalogError> {
        self.run(QueryOperation::ByCategory, &new_correlation_id(), |snapshot| {
            Ok(by_category(snapshot, params))
        })
        .await
    }

    pub async fn by_price_range(
        &self,
        params: &PriceRangeParams,
    ) -> Result<ListingReport, CatalogError> {
        self.run(QueryOperation::ByPriceRange, &new_correlation_id(), |snapshot| {
            Ok(by_price_range(snapshot, params))
        })
        .await
    }

    pub async fn by_stock_level(
        &self,
        params: &StockLevelParams,
    ) -> Result<ListingReport, CatalogError> {
        self.run(QueryOperation::ByStockLevel, &new_correlation_id(), |snapshot| {
            Ok(by_stock_level(snapshot, params))
        })
        .await
    }

    pub async fn by_brand_and_category(
        &self,
        params: &BrandCategoryParams,
    ) -> Result<ListingReport, CatalogError> {
        self.run(QueryOperation::ByBrandAndCategory, &new_correlation_id(), |snapshot| {
            Ok(by_brand_and_category(snapshot, params))
        })
        .await
    }

    pub async fn featured_only(&self) -> Result<ListingReport, CatalogError> {
        self.run(QueryOperation::FeaturedOnly, &new_correlation_id(), |snapshot| {
            Ok(featured_only(snapshot))
        })
        .await
    }

    pub async fn budget_recommendation(
        &self,
        params: &BudgetParams,
    ) -> Result<BudgetRecommendation, CatalogError> {
        self.run(QueryOperation::BudgetRecommendation, &new_correlation_id(), |snapshot| {
            budget_recommendation(snapshot, params)
        })
        .await
    }

    pub async fn personal_shopper(
        &self,
        params: &ShopperParams,
    ) -> Result<ShopperRecommendation, CatalogError> {
        self.run(QueryOperation::PersonalShopper, &new_correlation_id(), |snapshot| {
            personal_shopper(snapshot, &self.classifier, params)
        })
        .await
    }

    pub async fn execute(&self, request: &QueryRequest) -> Result<QueryResponse, CatalogError> {
        self.execute_with_correlation(request, &new_correlation_id()).await
    }

    /// Runs `request` with a caller-supplied correlation id, so transport layers can
    /// attach the same id to the failure they surface.
    pub async fn execute_with_correlation(
        &self,
        request: &QueryRequest,
        correlation_id: &str,
    ) -> Result<QueryResponse, CatalogError> {
        self.run(request.operation(), correlation_id, |snapshot| self.evaluate(snapshot, request))
            .await
    }

    /// Evaluates `request` against an already fetched snapshot.
    pub fn evaluate(
        &self,
        snapshot: &CatalogSnapshot,
        request: &QueryRequest,
    ) -> Result<QueryResponse, CatalogError> {
        let response = match request {
            QueryRequest::ListAll => QueryResponse::Listing(list_all(snapshot)),
            QueryRequest::Search(params) => QueryResponse::Listing(search(snapshot, params)),
            QueryRequest::ByCategory(params) => {
                QueryResponse::Listing(by_category(snapshot, params))
            }
            QueryRequest::ByPriceRange(params) => {
                QueryResponse::Listing(by_price_range(snapshot, params))
            }
            QueryRequest::ByStockLevel(params) => {
                QueryResponse::Listing(by_stock_level(snapshot, params))
            }
            QueryRequest::ByBrandAndCategory(params) => {
                QueryResponse::Listing(by_brand_and_category(snapshot, params))
            }
            QueryRequest::FeaturedOnly => QueryResponse::Listing(featured_only(snapshot)),
            QueryRequest::BudgetRecommendation(params) => {
                QueryResponse::Budget(budget_recommendation(snapshot, params)?)
            }
            QueryRequest::PersonalShopper(params) => {
                QueryResponse::Shopper(personal_shopper(snapshot, &self.classifier, params)?)
            }
        };
        Ok(response)
    }

    async fn run<T, F>(
        &self,
        operation: QueryOperation,
        correlation_id: &str,
        evaluate: F,
    ) -> Result<T, CatalogError>
    where
        T: MatchCount,
        F: FnOnce(&CatalogSnapshot) -> Result<T, CatalogError>,
    {
        info!(
            event_name = "catalog.query.started",
            correlation_id = correlation_id,
            operation = %operation,
            provider = self.provider.name(),
            "catalog query started"
        );

        let snapshot = match self.provider.fetch().await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(
                    event_name = "catalog.query.failed",
                    correlation_id = correlation_id,
                    operation = %operation,
                    provider = self.provider.name(),
                    error_class = error.error_class(),
                    error = %error,
                    "catalog query failed"
                );
                return Err(error);
            }
        };
        info!(
            event_name = "catalog.provider.fetched",
            correlation_id = correlation_id,
            operation = %operation,
            provider = self.provider.name(),
            product_count = snapshot.products.len(),
            quarantined_count = snapshot.quarantined.len(),
            "catalog snapshot fetched"
        );

        let outcome = match evaluate(&snapshot) {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(
                    event_name = "catalog.query.failed",
                    correlation_id = correlation_id,
                    operation = %operation,
                    provider = self.provider.name(),
                    error_class = error.error_class(),
                    error = %error,
                    "catalog query failed"
                );
                return Err(error);
            }
        };
        info!(
            event_name = "catalog.query.completed",
            correlation_id = correlation_id,
            operation = %operation,
            matched_count = outcome.match_count(),
            "catalog query completed"
        );
        Ok(outcome)
    }
}

fn list_all(snapshot: &CatalogSnapshot) -> ListingReport {
    ListingReport::new(QueryOperation::ListAll, snapshot, snapshot.products.clone(), || {
        EmptyReason::NoProducts
    })
}

fn search(snapshot: &CatalogSnapshot, params: &SearchParams) -> ListingReport {
    let products = select(&snapshot.products, |product| matches_text(product, &params.query));
    ListingReport::new(QueryOperation::Search, snapshot, products, || {
        EmptyReason::NoSearchMatches { query: params.query.clone() }
    })
}

fn by_category(snapshot: &CatalogSnapshot, params: &CategoryParams) -> ListingReport {
    let products =
        select(&snapshot.products, |product| matches_category(product, &params.category));
    ListingReport::new(QueryOperation::ByCategory, snapshot, products, || {
        EmptyReason::UnknownCategory {
            category: params.category.clone(),
            available: snapshot.known_categories(),
        }
    })
}

/// An inverted range is a valid query that matches nothing.
fn by_price_range(snapshot: &CatalogSnapshot, params: &PriceRangeParams) -> ListingReport {
    let matched = select(&snapshot.products, |product| {
        in_price_range(product, params.min_price, params.max_price)
    });
    let products = rank(matched, RankStrategy::PriceAscending);
    ListingReport::new(QueryOperation::ByPriceRange, snapshot, products, || {
        EmptyReason::NoPriceRangeMatches { min_price: params.min_price, max_price: params.max_price }
    })
}

fn by_stock_level(snapshot: &CatalogSnapshot, params: &StockLevelParams) -> ListingReport {
    let Some(tier) = StockTier::parse(&params.stock_level) else {
        return ListingReport::new(QueryOperation::ByStockLevel, snapshot, Vec::new(), || {
            EmptyReason::UnrecognizedStockLevel { label: params.stock_level.clone() }
        });
    };

    let matched = select(&snapshot.products, |product| matches_stock_tier(product, tier));
    let products = rank(matched, RankStrategy::StockDescending);
    let mut report = ListingReport::new(QueryOperation::ByStockLevel, snapshot, products, || {
        EmptyReason::NoStockTierMatches { tier }
    });
    report.stock_tier = Some(tier);
    report
}

fn by_brand_and_category(snapshot: &CatalogSnapshot, params: &BrandCategoryParams) -> ListingReport {
    let products = select(&snapshot.products, |product| {
        matches_brand_and_category(product, &params.brand, &params.category)
    });
    ListingReport::new(QueryOperation::ByBrandAndCategory, snapshot, products, || {
        EmptyReason::NoBrandCategoryMatches {
            brand: params.brand.clone(),
            category: params.category.clone(),
        }
    })
}

fn featured_only(snapshot: &CatalogSnapshot) -> ListingReport {
    let products = select(&snapshot.products, is_featured);
    ListingReport::new(QueryOperation::FeaturedOnly, snapshot, products, || {
        EmptyReason::NoFeaturedProducts
    })
}

fn budget_recommendation(
    snapshot: &CatalogSnapshot,
    params: &BudgetParams,
) -> Result<BudgetRecommendation, CatalogError> {
    let category = params.category_filter();
    let report = recommend_for_budget(&snapshot.products, params.budget, category)?;
    let empty_reason = report.is_empty().then(|| EmptyReason::NothingWithinBudget {
        budget: params.budget,
        category: category.map(str::to_owned),
    });

    Ok(BudgetRecommendation {
        budget: params.budget,
        category: category.map(str::to_owned),
        report,
        quarantined: snapshot.quarantined.len(),
        empty_reason,
    })
}

fn personal_shopper(
    snapshot: &CatalogSnapshot,
    classifier: &NeedClassifier,
    params: &ShopperParams,
) -> Result<ShopperRecommendation, CatalogError> {
    let classification = classifier.classify(&params.need);
    let report = recommend_for_need(&snapshot.products, &classification, params.budget)?;
    let empty_reason = report
        .is_empty()
        .then(|| EmptyReason::NoNeedMatches { need: params.need.clone(), rule: classification.rule });

    Ok(ShopperRecommendation {
        need: params.need.clone(),
        budget: params.budget,
        rule: classification.rule,
        matched_keyword: classification.matched_keyword,
        report,
        quarantined: snapshot.quarantined.len(),
        empty_reason,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{CatalogQueryService, EmptyReason, QueryResponse};
    use crate::catalog::{CatalogSnapshot, QuarantinedRecord, StaticCatalogProvider, DEFAULT_CATEGORIES};
    use crate::domain::query::{
        BudgetParams, CategoryParams, PriceRangeParams, QueryRequest, SearchParams, ShopperParams,
        StockLevelParams, StockTier,
    };
    use crate::errors::CatalogError;
    use crate::filters::classifier::NeedRule;
    use crate::filters::predicates::test_support::{branded, featured, in_category, product};

    fn service() -> CatalogQueryService<StaticCatalogProvider> {
        CatalogQueryService::new(StaticCatalogProvider::new(vec![
            in_category(branded(product("m1", "Çelik Tencere", 1200, 12), "Korkmaz"), "Mutfak"),
            in_category(featured(product("t1", "iPhone 15", 52000, 4)), "Telefon"),
            in_category(product("b1", "Gaming Laptop X", 38000, 60), "Bilgisayar"),
            in_category(product("b2", "Ofis Laptop", 21000, 0), "Bilgisayar"),
        ]))
    }

    #[tokio::test]
    async fn search_reports_no_matches() {
        let report = service()
            .search(&SearchParams { query: "dyson".to_owned() })
            .await
            .expect("search should succeed");

        assert!(report.products.is_empty());
        assert_eq!(report.empty_reason, Some(EmptyReason::NoSearchMatches { query: "dyson".to_owned() }));
    }

    #[tokio::test]
    async fn unknown_category_lists_snapshot_categories() {
        let report = service()
            .by_category(&CategoryParams { category: "Bahçe".to_owned() })
            .await
            .expect("category query should succeed");

        let Some(EmptyReason::UnknownCategory { available, .. }) = report.empty_reason else {
            panic!("expected unknown category context");
        };
        assert_eq!(available, vec!["Mutfak", "Telefon", "Bilgisayar"]);
    }

    #[tokio::test]
    async fn unknown_category_on_uncategorized_catalog_suggests_defaults() {
        let service = CatalogQueryService::new(StaticCatalogProvider::new(vec![product("x", "x", 1, 1)]));
        let report = service
            .by_category(&CategoryParams { category: "Bahçe".to_owned() })
            .await
            .expect("category query should succeed");

        let Some(EmptyReason::UnknownCategory { available, .. }) = report.empty_reason else {
            panic!("expected unknown category context");
        };
        assert_eq!(available.len(), DEFAULT_CATEGORIES.len());
    }

    #[tokio::test]
    async fn inverted_price_range_is_empty() {
        let report = service()
            .by_price_range(&PriceRangeParams {
                min_price: Decimal::new(5000, 0),
                max_price: Decimal::new(100, 0),
            })
            .await
            .expect("price range should succeed");
        assert_eq!(report.total_matched, 0);
        assert!(matches!(report.empty_reason, Some(EmptyReason::NoPriceRangeMatches { .. })));
    }

    #[tokio::test]
    async fn stock_level_sorts_descending_and_reports_tier() {
        let report = service()
            .by_stock_level(&StockLevelParams { stock_level: "low".to_owned() })
            .await
            .expect("stock level should succeed");

        let skus: Vec<_> = report.products.iter().map(|product| product.sku.0.as_str()).collect();
        assert_eq!(skus, vec!["m1", "t1"]);
        assert_eq!(report.stock_tier, Some(StockTier::Low));
    }

    #[tokio::test]
    async fn stock_level_labels_are_case_sensitive() {
        for label in ["LOW", " low ", "Low"] {
            let report = service()
                .by_stock_level(&StockLevelParams { stock_level: label.to_owned() })
                .await
                .expect("unrecognized labels are not errors");

            assert!(report.products.is_empty(), "{label:?} must match nothing");
            assert_eq!(report.stock_tier, None);
        }
    }

    #[tokio::test]
    async fn unrepresentable_totals_surface_as_bad_response() {
        let huge = Decimal::from_str_exact("50000000000000000000000000000").expect("valid decimal");
        let products = ["t1", "t2"]
            .into_iter()
            .map(|sku| {
                let mut pot = in_category(product(sku, "Tencere", 1, 5), "Mutfak");
                pot.price = huge;
                pot
            })
            .collect();
        let service = CatalogQueryService::new(StaticCatalogProvider::new(products));

        let error = service
            .personal_shopper(&ShopperParams { need: "tencere".to_owned(), budget: None })
            .await
            .expect_err("overflowing totals must not panic");
        assert!(matches!(error, CatalogError::ProviderBadResponse { status: None, .. }));
    }

    #[tokio::test]
    async fn unrecognized_stock_level_fails_closed() {
        let report = service()
            .by_stock_level(&StockLevelParams { stock_level: "plenty".to_owned() })
            .await
            .expect("unrecognized labels are not errors");

        assert!(report.products.is_empty());
        assert_eq!(report.stock_tier, None);
        assert!(matches!(report.empty_reason, Some(EmptyReason::UnrecognizedStockLevel { .. })));
    }

    #[tokio::test]
    async fn blank_budget_category_is_ignored() {
        let recommendation = service()
            .budget_recommendation(&BudgetParams {
                budget: Decimal::new(40000, 0),
                category: Some("   ".to_owned()),
            })
            .await
            .expect("budget recommendation should succeed");

        assert_eq!(recommendation.category, None);
        assert_eq!(recommendation.report.total_considered, 2);
    }

    #[tokio::test]
    async fn shopper_names_the_rule_and_budget_friendly_count() {
        let recommendation = service()
            .personal_shopper(&ShopperParams {
                need: "hediye laptop".to_owned(),
                budget: Some(Decimal::new(60000, 0)),
            })
            .await
            .expect("shopper should succeed");

        assert_eq!(recommendation.rule, NeedRule::Gift);
        assert_eq!(recommendation.report.ranked_top_n[0].product.sku.0, "t1");
        assert_eq!(recommendation.report.budget_friendly_count, Some(1));
    }

    #[tokio::test]
    async fn provider_failure_aborts_query() {
        let service = CatalogQueryService::new(StaticCatalogProvider::failing(
            CatalogError::ProviderTimeout { timeout_secs: 10 },
        ));
        let error = service.execute(&QueryRequest::ListAll).await.expect_err("fetch failure must surface");
        assert_eq!(error, CatalogError::ProviderTimeout { timeout_secs: 10 });
    }

    #[tokio::test]
    async fn listing_carries_quarantine_count() {
        let mut snapshot = CatalogSnapshot::new(vec![product("ok", "Ürün", 10, 1)]);
        snapshot.quarantined.push(QuarantinedRecord {
            index: 1,
            sku: None,
            reason: "missing field `sku`".to_owned(),
        });
        let service = CatalogQueryService::new(StaticCatalogProvider::from_snapshot(snapshot));

        let QueryResponse::Listing(report) =
            service.execute(&QueryRequest::ListAll).await.expect("listing should succeed")
        else {
            panic!("list-all yields a listing");
        };
        assert_eq!(report.total_matched, 1);
        assert_eq!(report.quarantined, 1);
    }

    #[test]
    fn depleted_message_for_out_of_stock_tier() {
        let message = EmptyReason::NoStockTierMatches { tier: StockTier::OutOfStock }.message();
        assert!(message.contains("depleted"));
    }
}
