//! Need classification: maps a free-text need to one composite product predicate.
//!
//! Rules are evaluated in descending priority and the first rule whose keyword
//! occurs in the normalized need wins, even when a later rule would also match.
//! When no rule matches, the need itself is used as a full-text filter.

use serde::{Deserialize, Serialize};

use super::predicates::fold;
use crate::domain::product::Product;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeedRule {
    Gift,
    Computing,
    Phone,
    Kitchen,
    MensApparel,
    WomensApparel,
    HomeFurniture,
    Technology,
    FullText,
}

impl NeedRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gift => "gift",
            Self::Computing => "computing",
            Self::Phone => "phone",
            Self::Kitchen => "kitchen",
            Self::MensApparel => "mens_apparel",
            Self::WomensApparel => "womens_apparel",
            Self::HomeFurniture => "home_furniture",
            Self::Technology => "technology",
            Self::FullText => "full_text",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NeedPredicate {
    /// Primary category contains any category term, or the name contains any name term.
    CategoryOrName { category_terms: Vec<String>, name_terms: Vec<String> },
    Featured,
    /// Name, description, brand or primary category contains the text.
    FullText { text: String },
}

impl NeedPredicate {
    pub fn category_or_name(category_terms: &[&str], name_terms: &[&str]) -> Self {
        Self::CategoryOrName {
            category_terms: category_terms.iter().map(|term| fold(term)).collect(),
            name_terms: name_terms.iter().map(|term| fold(term)).collect(),
        }
    }

    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::CategoryOrName { category_terms, name_terms } => {
                let category = product.primary_category().map(fold).unwrap_or_default();
                let name = fold(&product.name);
                category_terms.iter().any(|term| category.contains(term.as_str()))
                    || name_terms.iter().any(|term| name.contains(term.as_str()))
            }
            Self::Featured => product.featured,
            Self::FullText { text } => {
                let category = product.primary_category().map(fold).unwrap_or_default();
                fold(&product.name).contains(text.as_str())
                    || fold(&product.description).contains(text.as_str())
                    || product.brand.as_deref().map(fold).unwrap_or_default().contains(text.as_str())
                    || category.contains(text.as_str())
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassificationRule {
    pub rule: NeedRule,
    pub priority: u16,
    pub keywords: Vec<String>,
    pub predicate: NeedPredicate,
}

impl ClassificationRule {
    pub fn new(rule: NeedRule, priority: u16, keywords: &[&str], predicate: NeedPredicate) -> Self {
        Self { rule, priority, keywords: keywords.iter().map(|keyword| fold(keyword)).collect(), predicate }
    }

    fn matched_keyword(&self, normalized_need: &str) -> Option<&str> {
        self.keywords
            .iter()
            .find(|keyword| normalized_need.contains(keyword.as_str()))
            .map(String::as_str)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub rule: NeedRule,
    pub matched_keyword: Option<String>,
    pub predicate: NeedPredicate,
}

impl Classification {
    pub fn matches(&self, product: &Product) -> bool {
        self.predicate.matches(product)
    }
}

pub fn normalize_need(need: &str) -> String {
    fold(need.trim())
}

#[derive(Clone, Debug)]
pub struct NeedClassifier {
    rules: Vec<ClassificationRule>,
}

impl Default for NeedClassifier {
    fn default() -> Self {
        Self::with_rules(marketplace_rules())
    }
}

impl NeedClassifier {
    pub fn with_rules(rules: Vec<ClassificationRule>) -> Self {
        let mut classifier = Self { rules };
        classifier.sort();
        classifier
    }

    /// Adds a rule; equal priorities keep insertion order.
    pub fn insert(&mut self, rule: ClassificationRule) {
        self.rules.push(rule);
        self.sort();
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    pub fn classify(&self, need: &str) -> Classification {
        let normalized = normalize_need(need);

        for rule in &self.rules {
            if let Some(keyword) = rule.matched_keyword(&normalized) {
                return Classification {
                    rule: rule.rule,
                    matched_keyword: Some(keyword.to_owned()),
                    predicate: rule.predicate.clone(),
                };
            }
        }

        Classification {
            rule: NeedRule::FullText,
            matched_keyword: None,
            predicate: NeedPredicate::FullText { text: normalized },
        }
    }

    fn sort(&mut self) {
        self.rules.sort_by(|left, right| right.priority.cmp(&left.priority));
    }
}

/// The marketplace's rule cascade, highest priority first.
pub fn marketplace_rules() -> Vec<ClassificationRule> {
    vec![
        ClassificationRule::new(NeedRule::Gift, 90, &["hediye", "gift"], NeedPredicate::Featured),
        ClassificationRule::new(
            NeedRule::Computing,
            80,
            &["laptop", "bilgisayar", "gaming"],
            NeedPredicate::category_or_name(&["bilgisayar"], &["laptop", "macbook"]),
        ),
        ClassificationRule::new(
            NeedRule::Phone,
            70,
            &["telefon", "phone", "iphone"],
            NeedPredicate::category_or_name(&["telefon"], &["iphone", "phone"]),
        ),
        ClassificationRule::new(
            NeedRule::Kitchen,
            60,
            &["mutfak", "yemek", "tencere"],
            NeedPredicate::category_or_name(&["mutfak"], &["tencere", "yemek"]),
        ),
        ClassificationRule::new(
            NeedRule::MensApparel,
            50,
            &["erkek", "man"],
            NeedPredicate::category_or_name(&["erkek"], &["erkek"]),
        ),
        ClassificationRule::new(
            NeedRule::WomensApparel,
            40,
            &["kadın", "woman", "women"],
            NeedPredicate::category_or_name(&["kadın"], &["kadın"]),
        ),
        ClassificationRule::new(
            NeedRule::HomeFurniture,
            30,
            &["ev", "home", "mobilya"],
            NeedPredicate::category_or_name(&["mobilya", "mutfak"], &[]),
        ),
        ClassificationRule::new(
            NeedRule::Technology,
            20,
            &["teknoloji", "tech"],
            NeedPredicate::category_or_name(&["teknoloji", "bilgisayar", "telefon"], &[]),
        ),
    ]
}
