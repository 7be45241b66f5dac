//! Recommendation assembly: filter, rank, bound and annotate a candidate set.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::Product;
use crate::errors::AmountOverflow;
use crate::filters::classifier::Classification;
use crate::filters::predicates::{is_affordable, matches_category, select};
use crate::ranking::{rank_top_n, RankStrategy};

pub const BUDGET_TOP_N: usize = 5;
pub const NEED_TOP_N: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedProduct {
    pub product: Product,
    /// Effective price is within the budget; always true without a budget.
    pub affordable: bool,
    /// Amount above the budget, only for unaffordable picks.
    pub overage: Option<Decimal>,
}

impl RecommendedProduct {
    fn annotate(product: Product, budget: Option<Decimal>) -> Result<Self, AmountOverflow> {
        let price = product.effective_price();
        let affordable = budget.map_or(true, |budget| price <= budget);
        let overage = match budget {
            Some(budget) if !affordable => Some(price.checked_sub(budget).ok_or(AmountOverflow)?),
            _ => None,
        };
        Ok(Self { product, affordable, overage })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationReport {
    pub ranked_top_n: Vec<RecommendedProduct>,
    /// Size of the filtered set before truncation.
    pub total_considered: usize,
    pub total_of_top_n: Decimal,
    /// `budget - total_of_top_n`; negative when the picks jointly exceed the budget.
    pub remaining_budget: Option<Decimal>,
    pub featured_count: usize,
    pub budget_friendly_count: Option<usize>,
}

impl RecommendationReport {
    fn assemble(
        candidates: &[Product],
        strategy: RankStrategy,
        limit: usize,
        budget: Option<Decimal>,
    ) -> Result<Self, AmountOverflow> {
        let ranked_top_n = rank_top_n(candidates, strategy, limit)
            .into_iter()
            .map(|product| RecommendedProduct::annotate(product, budget))
            .collect::<Result<Vec<_>, _>>()?;
        let total_of_top_n = ranked_top_n.iter().try_fold(Decimal::ZERO, |total, pick| {
            total.checked_add(pick.product.effective_price()).ok_or(AmountOverflow)
        })?;
        let remaining_budget = budget
            .map(|budget| budget.checked_sub(total_of_top_n).ok_or(AmountOverflow))
            .transpose()?;

        Ok(Self {
            total_considered: candidates.len(),
            total_of_top_n,
            remaining_budget,
            featured_count: candidates.iter().filter(|product| product.featured).count(),
            budget_friendly_count: None,
            ranked_top_n,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.ranked_top_n.is_empty()
    }
}

/// Up to five in-stock products each priced within `budget`, featured first.
pub fn recommend_for_budget(
    products: &[Product],
    budget: Decimal,
    category: Option<&str>,
) -> Result<RecommendationReport, AmountOverflow> {
    let scoped = match category {
        Some(category) => select(products, |product| matches_category(product, category)),
        None => products.to_vec(),
    };
    let affordable =
        select(&scoped, |product| is_affordable(product, budget) && product.in_stock());

    RecommendationReport::assemble(&affordable, RankStrategy::FeaturedFirst, BUDGET_TOP_N, Some(budget))
}

/// Up to three in-stock products matching the classified need, by relevance.
pub fn recommend_for_need(
    products: &[Product],
    classification: &Classification,
    budget: Option<Decimal>,
) -> Result<RecommendationReport, AmountOverflow> {
    let mut candidates = select(products, |product| classification.matches(product));
    if let Some(budget) = budget {
        candidates = select(&candidates, |product| is_affordable(product, budget));
    }
    let candidates = select(&candidates, Product::in_stock);

    let mut report =
        RecommendationReport::assemble(&candidates, RankStrategy::Relevance, NEED_TOP_N, budget)?;
    report.budget_friendly_count = budget.map(|budget| {
        candidates.iter().filter(|product| is_affordable(product, budget)).count()
    });
    Ok(report)
}
