//! Candidate ordering. Every strategy is a stable sort, so ties keep their prior
//! relative order, and truncation only happens on a fully ordered set.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::domain::product::Product;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankStrategy {
    PriceAscending,
    StockDescending,
    /// Featured first, then effective price ascending.
    FeaturedFirst,
    /// Featured first, then stock descending, then effective price ascending.
    Relevance,
}

impl RankStrategy {
    pub fn compare(&self, left: &Product, right: &Product) -> Ordering {
        match self {
            Self::PriceAscending => by_price(left, right),
            Self::StockDescending => by_stock_desc(left, right),
            Self::FeaturedFirst => by_featured(left, right).then_with(|| by_price(left, right)),
            Self::Relevance => by_featured(left, right)
                .then_with(|| by_stock_desc(left, right))
                .then_with(|| by_price(left, right)),
        }
    }
}

fn by_price(left: &Product, right: &Product) -> Ordering {
    left.effective_price().cmp(&right.effective_price())
}

fn by_stock_desc(left: &Product, right: &Product) -> Ordering {
    right.stock.cmp(&left.stock)
}

fn by_featured(left: &Product, right: &Product) -> Ordering {
    right.featured.cmp(&left.featured)
}

pub fn rank(mut candidates: Vec<Product>, strategy: RankStrategy) -> Vec<Product> {
    candidates.sort_by(|left, right| strategy.compare(left, right));
    candidates
}

/// Orders the whole candidate set, then keeps the first `limit` products.
pub fn rank_top_n(candidates: &[Product], strategy: RankStrategy, limit: usize) -> Vec<Product> {
    let mut ranked = rank(candidates.to_vec(), strategy);
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{rank, rank_top_n, RankStrategy};
    use crate::domain::product::Product;
    use crate::filters::predicates::test_support::{featured, product};

    fn skus(products: &[Product]) -> Vec<&str> {
        products.iter().map(|product| product.sku.0.as_str()).collect()
    }

    #[test]
    fn price_ascending_uses_effective_price() {
        let mut vat_heavy = product("vat", "a", 100, 1);
        vat_heavy.vat_price = Some(Decimal::new(500, 0));
        let ranked = rank(
            vec![vat_heavy, product("cheap", "b", 200, 1), product("mid", "c", 300, 1)],
            RankStrategy::PriceAscending,
        );
        assert_eq!(skus(&ranked), vec!["cheap", "mid", "vat"]);
    }

    #[test]
    fn ties_keep_provider_order() {
        let ranked = rank(
            vec![product("first", "a", 100, 5), product("second", "b", 100, 9), product("third", "c", 100, 5)],
            RankStrategy::PriceAscending,
        );
        assert_eq!(skus(&ranked), vec!["first", "second", "third"]);

        let ranked = rank(
            vec![product("first", "a", 100, 5), product("second", "b", 300, 9), product("third", "c", 50, 5)],
            RankStrategy::StockDescending,
        );
        assert_eq!(skus(&ranked), vec!["second", "first", "third"]);
    }

    #[test]
    fn featured_first_then_price() {
        let ranked = rank(
            vec![
                product("plain-cheap", "a", 100, 1),
                featured(product("star-dear", "b", 900, 1)),
                featured(product("star-cheap", "c", 300, 1)),
                product("plain-dear", "d", 800, 1),
            ],
            RankStrategy::FeaturedFirst,
        );
        assert_eq!(skus(&ranked), vec!["star-cheap", "star-dear", "plain-cheap", "plain-dear"]);
    }

    #[test]
    fn relevance_is_featured_then_stock_then_price() {
        let ranked = rank(
            vec![
                product("plain-deep", "a", 100, 90),
                featured(product("star-thin", "b", 100, 2)),
                featured(product("star-deep-dear", "c", 700, 40)),
                featured(product("star-deep-cheap", "d", 600, 40)),
            ],
            RankStrategy::Relevance,
        );
        assert_eq!(skus(&ranked), vec!["star-deep-cheap", "star-deep-dear", "star-thin", "plain-deep"]);
    }

    #[test]
    fn truncation_happens_after_full_ordering() {
        let candidates = vec![
            product("a", "a", 500, 1),
            product("b", "b", 400, 1),
            product("c", "c", 300, 1),
            product("d", "d", 200, 1),
            featured(product("e", "e", 900, 1)),
        ];

        let top = rank_top_n(&candidates, RankStrategy::FeaturedFirst, 2);
        assert_eq!(skus(&top), vec!["e", "d"]);
        assert_eq!(candidates.len(), 5);

        assert!(rank_top_n(&candidates, RankStrategy::PriceAscending, 0).is_empty());
        assert_eq!(rank_top_n(&candidates, RankStrategy::PriceAscending, 10).len(), 5);
    }
}
