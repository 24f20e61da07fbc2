use crate::archive::slug::title_case;
use serde::{Deserialize, Serialize};

pub const OTHER_BRAND_SLUG: &str = "other";
const OTHER_BRAND_NAME: &str = "Other";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandRule {
    pub keyword: String,
    pub slug: String,
    #[serde(default)]
    pub name: String,
}

impl BrandRule {
    fn new(keyword: &str, slug: &str, name: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            slug: slug.to_string(),
            name: name.to_string(),
        }
    }
}

/// Ordered keyword table used to assign a brand slug to a photo.
///
/// Order is priority: the first rule whose keyword occurs anywhere in the
/// lowercased headline and caption wins, regardless of where in the text the
/// other brands appear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandCatalog {
    rules: Vec<BrandRule>,
}

impl Default for BrandCatalog {
    fn default() -> Self {
        Self::new(vec![
            BrandRule::new("nike", "nike", "Nike"),
            BrandRule::new("jordan", "jordan", "Jordan Brand"),
            BrandRule::new("adidas", "adidas", "Adidas"),
            BrandRule::new("under armour", "under-armour", "Under Armour"),
            BrandRule::new("new balance", "new-balance", "New Balance"),
            BrandRule::new("puma", "puma", "Puma"),
            BrandRule::new("converse", "converse", "Converse"),
            BrandRule::new("anta", "anta", "Anta"),
            BrandRule::new("li-ning", "li-ning", "Li-Ning"),
            BrandRule::new("peak", "peak", "Peak"),
        ])
    }
}

impl BrandCatalog {
    pub fn new(rules: Vec<BrandRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| BrandRule {
                keyword: rule.keyword.to_lowercase(),
                ..rule
            })
            .collect();
        Self { rules }
    }

    pub fn rules(&self) -> &[BrandRule] {
        &self.rules
    }

    /// Brand slug for already-lowercased text, `other` when nothing matches.
    pub fn classify(&self, lowered_text: &str) -> &str {
        self.rules
            .iter()
            .find(|rule| lowered_text.contains(rule.keyword.as_str()))
            .map(|rule| rule.slug.as_str())
            .unwrap_or(OTHER_BRAND_SLUG)
    }

    pub fn display_name(&self, slug: &str) -> String {
        if slug == OTHER_BRAND_SLUG {
            return OTHER_BRAND_NAME.to_string();
        }
        self.rules
            .iter()
            .find(|rule| rule.slug == slug && !rule.name.trim().is_empty())
            .map(|rule| rule.name.clone())
            .unwrap_or_else(|| title_case(slug))
    }
}
