//! AI-related domain models matching the AI service pricing schemas.

use serde::{Deserialize, Serialize};

use super::brand::Category;
use super::estimate::{EstimateResult, MaterialLine};
use super::project::Location;

/// One material line as sent to the AI service.
#[derive(Debug, Clone, Serialize)]
pub struct MaterialQuote {
    pub name: String,
    pub category: Category,
    pub quantity: f64,
    pub unit: String,
    pub unit_cost: f64,
}

impl From<&MaterialLine> for MaterialQuote {
    fn from(line: &MaterialLine) -> Self {
        Self {
            name: line.name.clone(),
            category: line.category,
            quantity: line.quantity,
            unit: line.unit.clone(),
            unit_cost: line.adjusted_unit_cost(),
        }
    }
}

/// Request for location-specific cost multipliers.
#[derive(Debug, Clone, Serialize)]
pub struct LocationMultiplierRequest {
    pub location: String,
    pub currency: String,
    pub materials: Vec<MaterialQuote>,
}

impl LocationMultiplierRequest {
    pub fn new(estimate: &EstimateResult, location: Location) -> Self {
        Self {
            location: location.name().to_string(),
            currency: estimate.currency().to_string(),
            materials: estimate.materials().iter().map(MaterialQuote::from).collect(),
        }
    }
}

/// Multiplier for a material name or a whole category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationMultiplier {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationMultiplierResponse {
    pub multipliers: Vec<LocationMultiplier>,
    #[serde(default)]
    pub rationale: Option<String>,
}

impl LocationMultiplierResponse {
    /// Name match wins over category match.
    pub fn multiplier_for(&self, line: &MaterialLine) -> Option<f64> {
        let by_name = self.multipliers.iter().find(|m| {
            m.name
                .as_deref()
                .is_some_and(|n| n.trim().eq_ignore_ascii_case(&line.name))
        });
        let by_category = || {
            self.multipliers.iter().find(|m| {
                m.name.is_none()
                    && m.category
                        .as_deref()
                        .is_some_and(|c| c.trim().eq_ignore_ascii_case(line.category.as_str()))
            })
        };

        by_name.or_else(by_category).map(|m| m.multiplier)
    }
}
