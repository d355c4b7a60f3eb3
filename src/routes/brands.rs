//! Brand recommendation endpoint.

use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::extract::WithRejection;
use std::sync::Arc;

use crate::app::AppState;
use crate::domain::{BrandQuery, BrandRecommendationsResponse, Location, QualityLevel};
use crate::error::{ApiError, ApiResult, ValidationError};

/// Ranked brands for a material. Without `quality` every brand available at
/// the location is listed, cheapest first.
///
/// GET /brands/recommendations?materialName=&location=&quality=
pub async fn get_recommendations(
    State(state): State<Arc<AppState>>,
    WithRejection(Query(query), _): WithRejection<Query<BrandQuery>, ApiError>,
) -> ApiResult<Json<BrandRecommendationsResponse>> {
    let mut errors = ValidationError::new();

    let material_name = match query.material_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => Some(name.to_string()),
        _ => {
            errors.push("materialName", "is required");
            None
        }
    };

    let location = match query.location.as_deref() {
        None => {
            errors.push("location", "is required");
            None
        }
        Some(raw) => raw
            .parse::<Location>()
            .map_err(|msg| errors.push("location", msg))
            .ok(),
    };

    let quality = match query.quality.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match raw.parse::<QualityLevel>() {
            Ok(level) => Some(level),
            Err(msg) => {
                errors.push("quality", msg);
                None
            }
        },
    };

    let (Some(material_name), Some(location)) = (material_name, location) else {
        return Err(errors.into());
    };
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let brands = state.pipeline.brands();
    let category = brands.category_of(&material_name);
    let recommendations = match quality {
        Some(level) => brands.recommend(category, location, level),
        None => brands.all_brands_for(&material_name, location),
    };

    Ok(Json(BrandRecommendationsResponse {
        material_name,
        category,
        location: location.name().to_string(),
        quality,
        recommendations,
    }))
}
