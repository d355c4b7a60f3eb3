//! Estimation and pricing core.

pub mod adjustment;
pub mod brands;
pub mod currency;
pub mod pipeline;
pub mod tables;
pub mod takeoff;

pub use adjustment::{AdjustmentStatus, DegradeReason, LocationPricing, MultiplierBounds, PriceAdjuster};
pub use brands::{BrandCatalog, BrandResolver};
pub use currency::{CurrencyService, BASE_CURRENCY};
pub use pipeline::{EstimationPipeline, PipelineOutput, Stage};
pub use tables::TakeoffTable;
pub use takeoff::TakeoffEngine;
