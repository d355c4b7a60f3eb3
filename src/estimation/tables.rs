//! Reviewable takeoff coefficients.
//!
//! The table is plain JSON (bundled under `data/`, replaceable by path) so
//! that quantities, unit costs, waste fractions and cost ratios can be tuned
//! without touching the engine.

use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::brands::category_of;
use crate::domain::{Category, CostRatios, Dimensions, ProjectType, QualityLevel};

const BUNDLED_TABLE: &str = include_str!("../../data/takeoff_table.json");

/// A value per quality tier.
///
/// In JSON either a single value (same for every tier) or an object with
/// `economy`, `standard`, `premium` and `luxury` keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tiered<T> {
    pub economy: T,
    pub standard: T,
    pub premium: T,
    pub luxury: T,
}

impl<T> Tiered<T> {
    pub fn get(&self, level: QualityLevel) -> &T {
        match level {
            QualityLevel::Economy => &self.economy,
            QualityLevel::Standard => &self.standard,
            QualityLevel::Premium => &self.premium,
            QualityLevel::Luxury => &self.luxury,
        }
    }

    /// Values in tier order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        QualityLevel::ALL.into_iter().map(move |q| self.get(q))
    }
}

impl Tiered<f64> {
    fn is_non_decreasing(&self) -> bool {
        let values: Vec<f64> = self.iter().copied().collect();
        values.windows(2).all(|w| w[0] <= w[1])
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TieredRepr<T> {
    Uniform(T),
    PerTier {
        economy: T,
        standard: T,
        premium: T,
        luxury: T,
    },
}

impl<'de, T> Deserialize<'de> for Tiered<T>
where
    T: Deserialize<'de> + Clone,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match TieredRepr::<T>::deserialize(deserializer)? {
            TieredRepr::Uniform(v) => Tiered {
                economy: v.clone(),
                standard: v.clone(),
                premium: v.clone(),
                luxury: v,
            },
            TieredRepr::PerTier {
                economy,
                standard,
                premium,
                luxury,
            } => Tiered {
                economy,
                standard,
                premium,
                luxury,
            },
        })
    }
}

/// Geometric measure a formula's quantity is proportional to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Basis {
    /// L × W
    FloorArea,
    /// 2(L + W) × H, the four enclosing walls
    WallArea,
    /// L × H, one face of a single wall
    FaceArea,
    /// 2(L + W)
    Perimeter,
    /// L
    Length,
    /// L × W × H
    Volume,
    /// L × √(W² + 4H²), both slopes of a gable roof rising H over span W
    PitchedRoofArea,
}

impl Basis {
    pub fn measure(&self, d: &Dimensions) -> f64 {
        let Dimensions {
            length: l,
            width: w,
            height: h,
        } = *d;
        match self {
            Self::FloorArea => l * w,
            Self::WallArea => 2.0 * (l + w) * h,
            Self::FaceArea => l * h,
            Self::Perimeter => 2.0 * (l + w),
            Self::Length => l,
            Self::Volume => l * w * h,
            Self::PitchedRoofArea => l * (w * w + 4.0 * h * h).sqrt(),
        }
    }
}

/// Quantity and cost rule for one material of a project type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialFormula {
    /// Material name per tier; a tier may substitute a different material.
    pub name: Tiered<String>,
    pub unit: String,
    pub basis: Basis,
    /// Quantity per unit of `basis`, before waste.
    pub per_unit: Tiered<f64>,
    /// Cost per `unit` in the base currency.
    pub unit_cost: Tiered<f64>,
    /// Only included in detailed estimates.
    #[serde(default)]
    pub detailed_only: bool,
}

impl MaterialFormula {
    /// Category shared by every tier's material name.
    pub fn category(&self) -> Category {
        category_of(&self.name.economy)
    }
}

/// The full coefficient table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TakeoffTable {
    /// Share of (material + labor + equipment) held back for risk.
    pub contingency_rate: f64,
    /// Labor cost as a share of material cost.
    pub labor_ratio: Tiered<f64>,
    /// Equipment cost as a share of material cost.
    pub equipment_ratio: Tiered<f64>,
    /// Waste fraction added to quantities, per category.
    pub waste: BTreeMap<Category, f64>,
    pub projects: BTreeMap<ProjectType, Vec<MaterialFormula>>,
}

impl TakeoffTable {
    /// Table shipped with the service under `data/`.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_TABLE).context("Bundled takeoff table is invalid")
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read takeoff table {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Invalid takeoff table {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let table: Self = serde_json::from_str(raw).context("Failed to parse takeoff table")?;
        table.validate()?;
        Ok(table)
    }

    pub fn formulas(&self, project_type: ProjectType) -> Option<&[MaterialFormula]> {
        self.projects.get(&project_type).map(Vec::as_slice)
    }

    pub fn waste_for(&self, category: Category) -> Option<f64> {
        self.waste.get(&category).copied()
    }

    pub fn cost_ratios(&self, level: QualityLevel) -> CostRatios {
        CostRatios {
            labor: *self.labor_ratio.get(level),
            equipment: *self.equipment_ratio.get(level),
            contingency: self.contingency_rate,
        }
    }

    /// Structural checks. Together they make higher tiers never cheaper
    /// than lower ones for the same project.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            (0.0..=0.5).contains(&self.contingency_rate),
            "contingency rate {} outside [0, 0.5]",
            self.contingency_rate
        );
        for (label, ratio) in [("labor", &self.labor_ratio), ("equipment", &self.equipment_ratio)] {
            ensure!(
                ratio.iter().all(|r| r.is_finite() && *r >= 0.0),
                "{} ratios must be non-negative",
                label
            );
            ensure!(
                ratio.is_non_decreasing(),
                "{} ratios must not decrease with quality",
                label
            );
        }
        for (category, waste) in &self.waste {
            ensure!(
                (0.0..=0.5).contains(waste),
                "waste fraction {} for {} outside [0, 0.5]",
                waste,
                category
            );
        }

        for project_type in ProjectType::ALL {
            let Some(formulas) = self.formulas(project_type) else {
                bail!("no formulas for project type {}", project_type);
            };
            ensure!(
                formulas.iter().any(|f| !f.detailed_only),
                "project type {} has no simple-mode formulas",
                project_type
            );
            for formula in formulas {
                self.validate_formula(project_type, formula)?;
            }
        }

        Ok(())
    }

    fn validate_formula(&self, project_type: ProjectType, formula: &MaterialFormula) -> Result<()> {
        let label = format!("{} / {}", project_type, formula.name.economy);

        ensure!(
            formula.per_unit.iter().all(|q| q.is_finite() && *q >= 0.0),
            "{}: quantities must be non-negative",
            label
        );
        ensure!(
            formula.unit_cost.iter().all(|c| c.is_finite() && *c > 0.0),
            "{}: unit costs must be positive",
            label
        );
        ensure!(
            formula.per_unit.is_non_decreasing(),
            "{}: quantity must not decrease with quality",
            label
        );
        ensure!(
            formula.unit_cost.is_non_decreasing(),
            "{}: unit cost must not decrease with quality",
            label
        );

        let category = formula.category();
        if let Some(name) = formula.name.iter().find(|n| category_of(n) != category) {
            bail!(
                "{}: tier material '{}' is not in category {}",
                label,
                name,
                category
            );
        }
        ensure!(
            self.waste_for(category).is_some(),
            "{}: no waste fraction for category {}",
            label,
            category
        );

        Ok(())
    }
}
