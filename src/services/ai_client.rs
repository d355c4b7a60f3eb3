//! AI service client for location pricing.
//!
//! Provides type-safe methods for:
//! - Location-specific material cost multipliers
//! - Health checks

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument};

use crate::domain::ai::{LocationMultiplierRequest, LocationMultiplierResponse};
use crate::error::ApiError;
use crate::estimation::LocationPricing;

/// Client for the AI service.
#[derive(Clone)]
pub struct AiClient {
    client: Client,
    base_url: String,
    token: String,
}

/// Error response from AI service.
#[derive(Debug, Deserialize)]
struct AiErrorResponse {
    #[allow(dead_code)]
    code: String,
    message: String,
    #[allow(dead_code)]
    request_id: Option<String>,
}

impl AiClient {
    /// Create a new AI service client.
    ///
    /// `timeout` bounds each HTTP call; the pricing stage applies its own
    /// deadline on top.
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        tracing::info!(base_url = base_url, "AI client initialized");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Make a POST request to the AI service.
    async fn post<T: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
        request_id: Option<&str>,
    ) -> Result<R, ApiError> {
        let url = format!("{}{}", self.base_url, path);

        let mut req = self
            .client
            .post(&url)
            .header("X-Internal-Token", &self.token)
            .header("Content-Type", "application/json");

        if let Some(rid) = request_id {
            req = req.header("x-request-id", rid);
        }

        debug!(url = %url, "AI service request");

        let response = req.json(body).send().await.map_err(|e| {
            error!(error = %e, "AI service request failed");
            ApiError::Internal(anyhow::anyhow!("AI service unavailable: {}", e))
        })?;

        let status = response.status();

        if status.is_success() {
            response.json::<R>().await.map_err(|e| {
                error!(error = %e, "Failed to parse AI service response");
                ApiError::Internal(anyhow::anyhow!("Invalid AI service response: {}", e))
            })
        } else {
            let error_body = response.json::<AiErrorResponse>().await.ok();

            let message = error_body
                .as_ref()
                .map(|e| e.message.clone())
                .unwrap_or_else(|| format!("AI service error: {}", status));

            match status {
                StatusCode::BAD_REQUEST => Err(ApiError::BadRequest(message)),
                StatusCode::UNAUTHORIZED => {
                    error!("AI service authentication failed");
                    Err(ApiError::Internal(anyhow::anyhow!("AI service auth error")))
                }
                StatusCode::NOT_FOUND => Err(ApiError::NotFound(message)),
                _ => {
                    error!(status = %status, message = %message, "AI service error");
                    Err(ApiError::Internal(anyhow::anyhow!(message)))
                }
            }
        }
    }

    /// Check AI service health.
    pub async fn health_check(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);

        self.client
            .get(&url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .context("AI service health check failed")?
            .error_for_status()
            .context("AI service unhealthy")?;

        Ok(())
    }

    /// Ask for cost multipliers for the given materials at a location.
    #[instrument(skip(self, request), fields(location = %request.location, materials = request.materials.len()))]
    pub async fn location_multipliers(
        &self,
        request: &LocationMultiplierRequest,
        request_id: Option<&str>,
    ) -> Result<LocationMultiplierResponse, ApiError> {
        self.post("/v1/pricing/location-multipliers", request, request_id)
            .await
    }
}

impl LocationPricing for AiClient {
    fn location_multipliers<'a>(
        &'a self,
        request: &'a LocationMultiplierRequest,
        request_id: Option<&'a str>,
    ) -> BoxFuture<'a, Result<LocationMultiplierResponse, ApiError>> {
        Box::pin(AiClient::location_multipliers(self, request, request_id))
    }
}
