pub mod brands;
pub mod currencies;
pub mod estimates;
pub mod health;

use axum::{routing::get, routing::post, Router};
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        // Estimates
        .route("/estimates/options", get(estimates::get_options))
        .route("/estimates", post(estimates::create_estimate))
        // Brands
        .route(
            "/brands/recommendations",
            get(brands::get_recommendations),
        )
        // Currencies
        .route("/currencies", get(currencies::list_currencies))
        .route("/currencies/convert", get(currencies::convert))
}
