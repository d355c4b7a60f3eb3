//! Currency DTOs.

use serde::{Deserialize, Serialize};

/// One row of the supported currency table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyResponse {
    pub code: String,
    pub symbol: String,
    /// Units of this currency per unit of the base currency.
    pub rate: f64,
    pub decimals: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyListResponse {
    pub base: String,
    pub currencies: Vec<CurrencyResponse>,
}

/// Query for `GET /currencies/convert`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertQuery {
    pub amount: f64,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResponse {
    pub amount: f64,
    pub from: String,
    pub to: String,
    pub converted: f64,
    pub formatted: String,
}
