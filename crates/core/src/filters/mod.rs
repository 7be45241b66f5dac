pub mod classifier;
pub mod predicates;

pub use classifier::{
    marketplace_rules, normalize_need, Classification, ClassificationRule, NeedClassifier,
    NeedPredicate, NeedRule,
};
pub use predicates::{
    in_price_range, is_affordable, is_featured, matches_brand, matches_brand_and_category,
    matches_category, matches_stock_level, matches_stock_tier, matches_text, select,
};
