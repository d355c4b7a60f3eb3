//! Estimate endpoints.

use axum::{extract::State, http::HeaderMap, Json};
use axum_extra::extract::WithRejection;
use std::sync::Arc;
use uuid::Uuid;

use crate::app::AppState;
use crate::domain::{EstimateOptionsResponse, EstimateRequest, EstimateResponse};
use crate::error::{ApiError, ApiResult};
use crate::middleware::RequestIdExt;

/// Closed input sets accepted by `POST /estimates`.
///
/// GET /estimates/options
pub async fn get_options() -> Json<EstimateOptionsResponse> {
    Json(EstimateOptionsResponse::current())
}

/// Run the estimation pipeline.
///
/// POST /estimates
pub async fn create_estimate(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    WithRejection(Json(req), _): WithRejection<Json<EstimateRequest>, ApiError>,
) -> ApiResult<Json<EstimateResponse>> {
    let request_id = headers
        .request_id()
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let input = req.validate(state.pipeline.currency())?;
    let output = state.pipeline.run(&input, Some(request_id.as_str())).await?;

    Ok(Json(state.pipeline.to_response(&output.result, &input)))
}
