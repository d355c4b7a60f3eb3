//! Location price adjustment backed by the AI service.
//!
//! The adjustment is advisory. Any failure (error, timeout, malformed
//! multipliers) returns the estimate untouched and is only visible in logs.

use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::ai::{LocationMultiplierRequest, LocationMultiplierResponse};
use crate::domain::{EstimateResult, Location};
use crate::error::ApiError;

/// Source of location-specific cost multipliers.
pub trait LocationPricing: Send + Sync {
    fn location_multipliers<'a>(
        &'a self,
        request: &'a LocationMultiplierRequest,
        request_id: Option<&'a str>,
    ) -> BoxFuture<'a, Result<LocationMultiplierResponse, ApiError>>;
}

/// Accepted multiplier range. Values outside are clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultiplierBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for MultiplierBounds {
    fn default() -> Self {
        Self { min: 0.5, max: 2.0 }
    }
}

impl MultiplierBounds {
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DegradeReason {
    Timeout,
    ServiceError(String),
    InvalidResponse(String),
}

impl DegradeReason {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::ServiceError(_) => "service_error",
            Self::InvalidResponse(_) => "invalid_response",
        }
    }
}

/// How the price adjustment stage ended.
#[derive(Debug, Clone, PartialEq)]
pub enum AdjustmentStatus {
    Applied { adjusted_lines: usize, clamped: usize },
    Disabled,
    Degraded(DegradeReason),
}

impl AdjustmentStatus {
    /// Value of the `pricing_source` log field.
    pub fn pricing_source(&self) -> &'static str {
        match self {
            Self::Applied { .. } => "ai_adjusted",
            Self::Disabled => "disabled",
            Self::Degraded(_) => "base_fallback",
        }
    }
}

#[derive(Clone)]
pub struct PriceAdjuster {
    source: Option<Arc<dyn LocationPricing>>,
    timeout: Duration,
    bounds: MultiplierBounds,
}

impl PriceAdjuster {
    pub fn new(source: Arc<dyn LocationPricing>, timeout: Duration, bounds: MultiplierBounds) -> Self {
        Self {
            source: Some(source),
            timeout,
            bounds,
        }
    }

    pub fn disabled() -> Self {
        Self {
            source: None,
            timeout: Duration::ZERO,
            bounds: MultiplierBounds::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.source.is_some()
    }

    /// Apply location multipliers to unit costs. Quantities and names never
    /// change; all aggregates are recomputed from the adjusted costs.
    pub async fn adjust(
        &self,
        estimate: EstimateResult,
        location: Location,
        request_id: Option<&str>,
    ) -> (EstimateResult, AdjustmentStatus) {
        let Some(source) = &self.source else {
            tracing::debug!(pricing_source = "disabled", "AI price adjustment disabled");
            return (estimate, AdjustmentStatus::Disabled);
        };

        let request = LocationMultiplierRequest::new(&estimate, location);
        let call = source.location_multipliers(&request, request_id);

        let (estimate, status) = match tokio::time::timeout(self.timeout, call).await {
            Err(_) => (estimate, AdjustmentStatus::Degraded(DegradeReason::Timeout)),
            Ok(Err(e)) => (
                estimate,
                AdjustmentStatus::Degraded(DegradeReason::ServiceError(e.to_string())),
            ),
            Ok(Ok(response)) => self.apply(estimate, &response),
        };

        match &status {
            AdjustmentStatus::Applied {
                adjusted_lines,
                clamped,
            } => tracing::info!(
                pricing_source = status.pricing_source(),
                location = %location,
                adjusted_lines,
                clamped,
                "Applied AI location pricing"
            ),
            AdjustmentStatus::Degraded(reason) => tracing::warn!(
                pricing_source = status.pricing_source(),
                location = %location,
                reason = reason.kind(),
                detail = ?reason,
                "AI price adjustment failed, using base prices"
            ),
            AdjustmentStatus::Disabled => {}
        }

        (estimate, status)
    }

    fn apply(
        &self,
        mut estimate: EstimateResult,
        response: &LocationMultiplierResponse,
    ) -> (EstimateResult, AdjustmentStatus) {
        if let Some(bad) = response
            .multipliers
            .iter()
            .find(|m| !m.multiplier.is_finite() || m.multiplier <= 0.0)
        {
            let reason = DegradeReason::InvalidResponse(format!(
                "multiplier {} is not a positive number",
                bad.multiplier
            ));
            return (estimate, AdjustmentStatus::Degraded(reason));
        }

        let mut adjusted_lines = 0;
        let mut clamped = 0;
        estimate.update_lines(|line| {
            let Some(raw) = response.multiplier_for(line) else {
                return;
            };
            let multiplier = self.bounds.clamp(raw);
            if multiplier != raw {
                clamped += 1;
                tracing::warn!(
                    material = %line.name,
                    raw_multiplier = raw,
                    applied_multiplier = multiplier,
                    "Clamped out-of-range AI multiplier"
                );
            }
            line.scale_unit_cost(multiplier);
            adjusted_lines += 1;
        });

        (
            estimate,
            AdjustmentStatus::Applied {
                adjusted_lines,
                clamped,
            },
        )
    }
}
