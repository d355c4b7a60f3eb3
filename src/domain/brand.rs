//! Material categories and brand recommendation types.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::project::QualityLevel;

/// Fixed material taxonomy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Cement,
    Aggregate,
    Steel,
    Masonry,
    Wood,
    Roofing,
    Waterproofing,
    Electrical,
    Plumbing,
    Finishing,
    Other,
}

impl Category {
    pub const ALL: [Category; 11] = [
        Self::Cement,
        Self::Aggregate,
        Self::Steel,
        Self::Masonry,
        Self::Wood,
        Self::Roofing,
        Self::Waterproofing,
        Self::Electrical,
        Self::Plumbing,
        Self::Finishing,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cement => "cement",
            Self::Aggregate => "aggregate",
            Self::Steel => "steel",
            Self::Masonry => "masonry",
            Self::Wood => "wood",
            Self::Roofing => "roofing",
            Self::Waterproofing => "waterproofing",
            Self::Electrical => "electrical",
            Self::Plumbing => "plumbing",
            Self::Finishing => "finishing",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ranked brand for a category, best fit first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandRecommendation {
    pub rank: usize,
    pub name: String,
    pub price_multiplier: f64,
    pub quality_level: QualityLevel,
}

/// Brand chosen for a material line during enrichment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandSelection {
    pub name: String,
    pub multiplier: f64,
}

impl From<&BrandRecommendation> for BrandSelection {
    fn from(rec: &BrandRecommendation) -> Self {
        Self {
            name: rec.name.clone(),
            multiplier: rec.price_multiplier,
        }
    }
}

/// Query for `GET /brands/recommendations`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandQuery {
    #[serde(default)]
    pub material_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub quality: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandRecommendationsResponse {
    pub material_name: String,
    pub category: Category,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<QualityLevel>,
    pub recommendations: Vec<BrandRecommendation>,
}
