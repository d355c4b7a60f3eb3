//! Material classification and brand recommendations.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::Path;

use crate::domain::{BrandRecommendation, Category, Location, QualityLevel};

const BUNDLED_CATALOG: &str = include_str!("../../data/brand_catalog.json");

/// Keyword rules, checked in order. The first matching rule wins, so
/// "Concrete roof tiles" is roofing and "Hollow concrete blocks" is masonry.
/// Keywords only match at the start of a word: "roof" hits "roofing" but
/// not "waterproofing".
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Roofing, &["roof", "shingle"]),
    (Category::Masonry, &["brick", "block"]),
    (Category::Steel, &["steel", "rebar", "reinforcement"]),
    (Category::Waterproofing, &["waterproof", "bitumen", "damp proof"]),
    (Category::Aggregate, &["sand", "gravel", "aggregate", "crushed stone"]),
    (Category::Cement, &["cement", "concrete"]),
    (
        Category::Wood,
        &["timber", "wood", "plywood", "lumber", "mdf", "batten", "rafter"],
    ),
    (
        Category::Electrical,
        &["electric", "wire", "cable", "switch", "socket", "conduit"],
    ),
    (
        Category::Plumbing,
        &["pipe", "plumb", "sanitary", "fitting", "gutter", "valve", "faucet"],
    ),
    (
        Category::Finishing,
        &[
            "paint", "primer", "plaster", "gypsum", "tile", "grout", "adhesive", "putty",
            "varnish", "skirting", "marble", "ceiling",
        ],
    ),
];

/// Classify a material name into the fixed taxonomy.
pub fn category_of(material_name: &str) -> Category {
    let name = material_name.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| starts_word(&name, k)))
        .map_or(Category::Other, |(category, _)| *category)
}

fn starts_word(name: &str, keyword: &str) -> bool {
    name.match_indices(keyword).any(|(i, _)| {
        name[..i]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric())
    })
}

/// One catalog row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandEntry {
    pub name: String,
    pub category: Category,
    pub quality: QualityLevel,
    pub price_multiplier: f64,
    /// Empty means available everywhere.
    #[serde(default)]
    pub regions: Vec<Location>,
}

impl BrandEntry {
    pub fn available_in(&self, location: Location) -> bool {
        self.regions.is_empty() || self.regions.contains(&location)
    }
}

/// Brand catalog, loaded once at startup.
#[derive(Debug, Clone)]
pub struct BrandCatalog {
    entries: Vec<BrandEntry>,
}

impl BrandCatalog {
    /// Catalog shipped with the service under `data/`.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_CATALOG).context("Bundled brand catalog is invalid")
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read brand catalog {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Invalid brand catalog {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let entries: Vec<BrandEntry> =
            serde_json::from_str(raw).context("Failed to parse brand catalog")?;
        let catalog = Self { entries };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn entries(&self) -> &[BrandEntry] {
        &self.entries
    }

    /// Multipliers must be positive, and within every (category, location)
    /// no brand may be cheaper than a brand of a lower tier.
    fn validate(&self) -> Result<()> {
        for entry in &self.entries {
            if !entry.price_multiplier.is_finite() || entry.price_multiplier <= 0.0 {
                bail!(
                    "brand '{}' has invalid price multiplier {}",
                    entry.name,
                    entry.price_multiplier
                );
            }
        }

        for location in Location::ALL {
            for category in Category::ALL {
                let group: Vec<&BrandEntry> = self
                    .entries
                    .iter()
                    .filter(|e| e.category == category && e.available_in(location))
                    .collect();

                for lower in &group {
                    for higher in &group {
                        if lower.quality < higher.quality
                            && lower.price_multiplier > higher.price_multiplier
                        {
                            bail!(
                                "{} brand '{}' ({}) costs more than {} brand '{}' ({}) for {} in {}",
                                lower.quality,
                                lower.name,
                                lower.price_multiplier,
                                higher.quality,
                                higher.name,
                                higher.price_multiplier,
                                category,
                                location
                            );
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

/// Ranks catalog brands per category, location and quality tier.
#[derive(Debug, Clone)]
pub struct BrandResolver {
    catalog: BrandCatalog,
}

impl BrandResolver {
    pub fn new(catalog: BrandCatalog) -> Self {
        Self { catalog }
    }

    pub fn category_of(&self, material_name: &str) -> Category {
        category_of(material_name)
    }

    fn candidates(&self, category: Category, location: Location) -> Vec<&BrandEntry> {
        self.catalog
            .entries()
            .iter()
            .filter(|e| e.category == category && e.available_in(location))
            .collect()
    }

    /// Best fit first: exact tier, then adjacent tiers, cheaper first on ties.
    /// Empty when the catalog has nothing for the category in `location`.
    pub fn recommend(
        &self,
        category: Category,
        location: Location,
        quality: QualityLevel,
    ) -> Vec<BrandRecommendation> {
        let mut brands = self.candidates(category, location);
        brands.sort_by(|a, b| {
            a.quality
                .distance(quality)
                .cmp(&b.quality.distance(quality))
                .then_with(|| cheaper_first(a, b))
        });
        ranked(brands)
    }

    /// Cheapest brand at or below the requested tier first. Used when the
    /// estimate is over the caller's budget.
    pub fn recommend_within_budget(
        &self,
        category: Category,
        location: Location,
        quality: QualityLevel,
    ) -> Vec<BrandRecommendation> {
        let mut brands: Vec<&BrandEntry> = self
            .candidates(category, location)
            .into_iter()
            .filter(|e| e.quality <= quality)
            .collect();
        brands.sort_by(|a, b| cheaper_first(a, b));
        ranked(brands)
    }

    /// Quality-agnostic list for a material, cheapest first.
    pub fn all_brands_for(&self, material_name: &str, location: Location) -> Vec<BrandRecommendation> {
        let mut brands = self.candidates(category_of(material_name), location);
        brands.sort_by(|a, b| cheaper_first(a, b));
        ranked(brands)
    }
}

fn cheaper_first(a: &BrandEntry, b: &BrandEntry) -> Ordering {
    a.price_multiplier
        .total_cmp(&b.price_multiplier)
        .then_with(|| a.name.cmp(&b.name))
}

fn ranked(brands: Vec<&BrandEntry>) -> Vec<BrandRecommendation> {
    brands
        .into_iter()
        .enumerate()
        .map(|(i, e)| BrandRecommendation {
            rank: i + 1,
            name: e.name.clone(),
            price_multiplier: e.price_multiplier,
            quality_level: e.quality,
        })
        .collect()
}
