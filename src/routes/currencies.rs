//! Currency table and conversion endpoints.

use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::extract::WithRejection;
use std::sync::Arc;

use crate::app::AppState;
use crate::domain::currency::{ConversionResponse, ConvertQuery, CurrencyListResponse};
use crate::error::{ApiError, ApiResult, ValidationError};
use crate::estimation::BASE_CURRENCY;

/// GET /currencies
pub async fn list_currencies(State(state): State<Arc<AppState>>) -> Json<CurrencyListResponse> {
    Json(CurrencyListResponse {
        base: BASE_CURRENCY.to_string(),
        currencies: state.pipeline.currency().supported(),
    })
}

/// GET /currencies/convert?amount=&from=&to=
pub async fn convert(
    State(state): State<Arc<AppState>>,
    WithRejection(Query(query), _): WithRejection<Query<ConvertQuery>, ApiError>,
) -> ApiResult<Json<ConversionResponse>> {
    let currencies = state.pipeline.currency();

    let mut errors = ValidationError::new();
    if !query.amount.is_finite() {
        errors.push("amount", "must be a finite number");
    }
    for (field, code) in [("from", &query.from), ("to", &query.to)] {
        if !currencies.is_supported(code) {
            errors.push(field, format!("unsupported currency '{}'", code));
        }
    }
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let from = query.from.trim().to_ascii_uppercase();
    let to = query.to.trim().to_ascii_uppercase();
    let converted = currencies.convert(query.amount, &from, &to);

    Ok(Json(ConversionResponse {
        amount: query.amount,
        formatted: currencies.format(converted, &to),
        from,
        to,
        converted,
    }))
}
