//! End-to-end estimation flow.
//!
//! Stages run strictly in order and never feed back:
//! takeoff, brand enrichment, AI price adjustment, currency normalization.
//! The only suspension point is the AI call inside [`PriceAdjuster::adjust`].

use std::fmt;
use tracing::instrument;

use super::adjustment::{AdjustmentStatus, PriceAdjuster};
use super::brands::BrandResolver;
use super::currency::CurrencyService;
use super::takeoff::TakeoffEngine;
use crate::domain::{
    BrandSelection, BudgetSummary, EstimateResponse, EstimateResult, MaterialLineResponse,
    ProjectInput,
};
use crate::error::EstimateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ValidatedInput,
    TakeoffComplete,
    BrandEnriched,
    PriceAdjusted,
    CurrencyNormalized,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ValidatedInput => "VALIDATED_INPUT",
            Self::TakeoffComplete => "TAKEOFF_COMPLETE",
            Self::BrandEnriched => "BRAND_ENRICHED",
            Self::PriceAdjusted => "PRICE_ADJUSTED",
            Self::CurrencyNormalized => "CURRENCY_NORMALIZED",
        };
        f.write_str(s)
    }
}

/// Final estimate plus how the AI stage ended.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub result: EstimateResult,
    pub adjustment: AdjustmentStatus,
}

/// Read-only after construction; shared by every request.
#[derive(Clone)]
pub struct EstimationPipeline {
    takeoff: TakeoffEngine,
    brands: BrandResolver,
    currency: CurrencyService,
    adjuster: PriceAdjuster,
}

impl EstimationPipeline {
    pub fn new(
        takeoff: TakeoffEngine,
        brands: BrandResolver,
        currency: CurrencyService,
        adjuster: PriceAdjuster,
    ) -> Self {
        Self {
            takeoff,
            brands,
            currency,
            adjuster,
        }
    }

    pub fn currency(&self) -> &CurrencyService {
        &self.currency
    }

    pub fn brands(&self) -> &BrandResolver {
        &self.brands
    }

    pub fn ai_enabled(&self) -> bool {
        self.adjuster.is_enabled()
    }

    #[instrument(
        skip(self, input),
        fields(
            project_type = %input.project_type,
            location = %input.location,
            quality = %input.quality_level,
        )
    )]
    pub async fn run(
        &self,
        input: &ProjectInput,
        request_id: Option<&str>,
    ) -> Result<PipelineOutput, EstimateError> {
        tracing::debug!(stage = %Stage::ValidatedInput, "Estimation started");

        let mut estimate = self.takeoff.calculate(input)?;
        estimate.verify()?;
        tracing::debug!(
            stage = %Stage::TakeoffComplete,
            lines = estimate.materials().len(),
            "Takeoff complete"
        );

        let branded = self.enrich_brands(&mut estimate, input);
        tracing::debug!(stage = %Stage::BrandEnriched, branded, "Brands attached");

        let (mut estimate, adjustment) = self
            .adjuster
            .adjust(estimate, input.location, request_id)
            .await;
        tracing::debug!(
            stage = %Stage::PriceAdjusted,
            pricing_source = adjustment.pricing_source(),
            "Price adjustment finished"
        );

        let target = input.response_currency().to_string();
        let from = estimate.currency().to_string();
        estimate.convert_to(&target, |amount| self.currency.convert(amount, &from, &target));
        estimate.verify()?;
        tracing::debug!(stage = %Stage::CurrencyNormalized, currency = %target, "Estimate normalized");

        tracing::info!(
            total_cost = estimate.pricing().total_cost,
            currency = %target,
            pricing_source = adjustment.pricing_source(),
            "Estimate computed"
        );

        Ok(PipelineOutput {
            result: estimate,
            adjustment,
        })
    }

    /// Attach the top brand per line. Over budget, the cheapest brand at or
    /// below the requested tier is picked instead of the best tier fit.
    fn enrich_brands(&self, estimate: &mut EstimateResult, input: &ProjectInput) -> usize {
        let over_budget = input.budget.is_some_and(|budget| {
            let total = self.currency.convert(
                estimate.pricing().total_cost,
                estimate.currency(),
                input.response_currency(),
            );
            total > budget
        });
        if over_budget {
            tracing::debug!("Base estimate exceeds budget, ranking brands by price");
        }

        let mut branded = 0;
        estimate.update_lines(|line| {
            let category = self.brands.category_of(&line.name);
            let recommendations = if over_budget {
                self.brands
                    .recommend_within_budget(category, input.location, input.quality_level)
            } else {
                self.brands
                    .recommend(category, input.location, input.quality_level)
            };
            if let Some(top) = recommendations.first() {
                line.apply_brand(BrandSelection::from(top));
                branded += 1;
            }
        });
        branded
    }

    /// Response body for a finished estimate.
    pub fn to_response(&self, result: &EstimateResult, input: &ProjectInput) -> EstimateResponse {
        let total = result.pricing().total_cost;
        EstimateResponse {
            materials: result.materials().iter().map(MaterialLineResponse::from).collect(),
            pricing: *result.pricing(),
            currency: result.currency().to_string(),
            formatted_total: self.currency.format(total, result.currency()),
            budget: input.budget.map(|amount| BudgetSummary::new(amount, total)),
        }
    }
}
