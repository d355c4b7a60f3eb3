//! Estimate result types.
//!
//! `MaterialLine::line_total` and every `PricingBreakdown` figure are derived
//! values. They are only ever written by recomputation, so a result can never
//! hold a stale blend of old and new unit costs.

use serde::{Deserialize, Serialize};

use super::brand::{BrandSelection, Category};
use crate::error::EstimateError;

/// Relative tolerance used when checking aggregate consistency.
const SUM_TOLERANCE: f64 = 1e-6;

/// Ratios deriving labor, equipment and contingency from material cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostRatios {
    pub labor: f64,
    pub equipment: f64,
    pub contingency: f64,
}

/// One row of the bill of materials.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialLine {
    pub name: String,
    pub category: Category,
    /// Quantity including the waste buffer.
    pub quantity: f64,
    pub unit: String,
    /// Waste fraction already included in `quantity`.
    pub waste_fraction: f64,
    /// Unit cost straight from the takeoff table.
    pub base_unit_cost: f64,
    pub brand: Option<BrandSelection>,
    adjusted_unit_cost: f64,
    line_total: f64,
}

impl MaterialLine {
    pub fn new(
        name: impl Into<String>,
        category: Category,
        quantity: f64,
        unit: impl Into<String>,
        waste_fraction: f64,
        base_unit_cost: f64,
    ) -> Self {
        let mut line = Self {
            name: name.into(),
            category,
            quantity,
            unit: unit.into(),
            waste_fraction,
            base_unit_cost,
            brand: None,
            adjusted_unit_cost: base_unit_cost,
            line_total: 0.0,
        };
        line.recompute();
        line
    }

    /// Unit cost after brand and location adjustments.
    pub fn adjusted_unit_cost(&self) -> f64 {
        self.adjusted_unit_cost
    }

    pub fn line_total(&self) -> f64 {
        self.line_total
    }

    /// Attach a brand and price the line from the base cost times its multiplier.
    pub fn apply_brand(&mut self, brand: BrandSelection) {
        self.adjusted_unit_cost = self.base_unit_cost * brand.multiplier;
        self.brand = Some(brand);
        self.recompute();
    }

    pub fn scale_unit_cost(&mut self, factor: f64) {
        self.adjusted_unit_cost *= factor;
        self.recompute();
    }

    /// Re-express both unit costs through `convert`.
    pub fn convert_costs(&mut self, convert: impl Fn(f64) -> f64) {
        self.base_unit_cost = convert(self.base_unit_cost);
        self.adjusted_unit_cost = convert(self.adjusted_unit_cost);
        self.recompute();
    }

    fn recompute(&mut self) {
        self.line_total = self.quantity * self.adjusted_unit_cost;
    }
}

/// Aggregate cost buckets of an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingBreakdown {
    pub material_cost: f64,
    pub labor_cost: f64,
    pub equipment_cost: f64,
    pub contingency: f64,
    pub total_cost: f64,
}

impl PricingBreakdown {
    pub fn from_lines(lines: &[MaterialLine], ratios: &CostRatios) -> Self {
        let material_cost: f64 = lines.iter().map(MaterialLine::line_total).sum();
        let labor_cost = material_cost * ratios.labor;
        let equipment_cost = material_cost * ratios.equipment;
        let contingency = (material_cost + labor_cost + equipment_cost) * ratios.contingency;

        Self {
            material_cost,
            labor_cost,
            equipment_cost,
            contingency,
            total_cost: material_cost + labor_cost + equipment_cost + contingency,
        }
    }
}

/// Materials plus pricing, expressed in `currency`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateResult {
    materials: Vec<MaterialLine>,
    pricing: PricingBreakdown,
    ratios: CostRatios,
    currency: String,
}

impl EstimateResult {
    pub fn new(materials: Vec<MaterialLine>, ratios: CostRatios, currency: impl Into<String>) -> Self {
        let pricing = PricingBreakdown::from_lines(&materials, &ratios);
        Self {
            materials,
            pricing,
            ratios,
            currency: currency.into(),
        }
    }

    pub fn materials(&self) -> &[MaterialLine] {
        &self.materials
    }

    pub fn pricing(&self) -> &PricingBreakdown {
        &self.pricing
    }

    pub fn ratios(&self) -> &CostRatios {
        &self.ratios
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Mutate every line, then recompute the aggregates from the new values.
    pub fn update_lines(&mut self, mut f: impl FnMut(&mut MaterialLine)) {
        for line in &mut self.materials {
            f(line);
        }
        self.pricing = PricingBreakdown::from_lines(&self.materials, &self.ratios);
    }

    /// Convert every unit cost to `currency` and recompute the aggregates.
    pub fn convert_to(&mut self, currency: &str, convert: impl Fn(f64) -> f64) {
        self.update_lines(|line| line.convert_costs(&convert));
        self.currency = currency.to_string();
    }

    /// Check the invariants every emitted estimate must satisfy.
    pub fn verify(&self) -> Result<(), EstimateError> {
        for line in &self.materials {
            if !line.quantity.is_finite() || line.quantity < 0.0 {
                return Err(EstimateError::Computation(format!(
                    "invalid quantity {} for '{}'",
                    line.quantity, line.name
                )));
            }
            let costs = [line.base_unit_cost, line.adjusted_unit_cost, line.line_total];
            if costs.iter().any(|c| !c.is_finite() || *c < 0.0) {
                return Err(EstimateError::Computation(format!(
                    "invalid cost for '{}'",
                    line.name
                )));
            }
        }

        let p = &self.pricing;
        let parts = [p.material_cost, p.labor_cost, p.equipment_cost, p.contingency];
        if parts.iter().chain([&p.total_cost]).any(|c| !c.is_finite() || *c < 0.0) {
            return Err(EstimateError::Computation(
                "pricing contains a negative or non-finite component".to_string(),
            ));
        }

        let line_sum: f64 = self.materials.iter().map(MaterialLine::line_total).sum();
        if !approx_eq(line_sum, p.material_cost) || !approx_eq(parts.iter().sum(), p.total_cost) {
            return Err(EstimateError::Computation(
                "pricing totals do not match their components".to_string(),
            ));
        }

        Ok(())
    }
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= SUM_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

// =============================================================================
// Response DTOs
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialLineResponse {
    pub name: String,
    pub category: Category,
    pub quantity: f64,
    pub unit: String,
    pub unit_cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_multiplier: Option<f64>,
    pub line_total: f64,
}

impl From<&MaterialLine> for MaterialLineResponse {
    fn from(line: &MaterialLine) -> Self {
        Self {
            name: line.name.clone(),
            category: line.category,
            quantity: line.quantity,
            unit: line.unit.clone(),
            unit_cost: line.adjusted_unit_cost(),
            recommended_brand: line.brand.as_ref().map(|b| b.name.clone()),
            brand_multiplier: line.brand.as_ref().map(|b| b.multiplier),
            line_total: line.line_total(),
        }
    }
}

/// Budget comparison in the response currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    pub amount: f64,
    pub within_budget: bool,
    pub remaining: f64,
}

impl BudgetSummary {
    pub fn new(amount: f64, total_cost: f64) -> Self {
        Self {
            amount,
            within_budget: total_cost <= amount,
            remaining: amount - total_cost,
        }
    }
}

/// Response body for `POST /estimates`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateResponse {
    pub materials: Vec<MaterialLineResponse>,
    pub pricing: PricingBreakdown,
    pub currency: String,
    pub formatted_total: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<BudgetSummary>,
}
