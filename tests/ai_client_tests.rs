//! AI client and price adjustment against a mock AI service.

mod common;

use httpmock::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use estimator_backend::{
    domain::ai::LocationMultiplierRequest,
    domain::{Dimensions, EstimationMode, Location, ProjectInput, ProjectType, QualityLevel},
    error::ApiError,
    estimation::{AdjustmentStatus, DegradeReason, LocationPricing, MultiplierBounds, PriceAdjuster},
    services::AiClient,
};

const TOKEN: &str = "internal-token";

fn client(server: &MockServer) -> AiClient {
    AiClient::new(&server.base_url(), TOKEN, Duration::from_secs(2)).unwrap()
}

fn adjuster(client: AiClient, timeout: Duration) -> PriceAdjuster {
    let source: Arc<dyn LocationPricing> = Arc::new(client);
    PriceAdjuster::new(source, timeout, MultiplierBounds::default())
}

fn room() -> ProjectInput {
    ProjectInput {
        project_type: ProjectType::Room,
        dimensions: Dimensions {
            length: 4.0,
            width: 5.0,
            height: 3.0,
        },
        location: Location::Morocco,
        quality_level: QualityLevel::Standard,
        estimation_mode: EstimationMode::Simple,
        budget: None,
        currency: None,
    }
}

#[tokio::test]
async fn test_location_multipliers_request_shape() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/pricing/location-multipliers")
                .header("X-Internal-Token", TOKEN)
                .header("x-request-id", "req-1");
            then.status(200).json_body(json!({
                "multipliers": [{ "category": "finishing", "multiplier": 1.1 }],
                "rationale": "import costs"
            }));
        })
        .await;

    let pipeline = common::pipeline(PriceAdjuster::disabled());
    let base = pipeline.run(&room(), None).await.unwrap();
    let request = LocationMultiplierRequest::new(&base.result, Location::Morocco);

    let response = client(&server)
        .location_multipliers(&request, Some("req-1"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response.multipliers.len(), 1);
    assert_eq!(response.rationale.as_deref(), Some("import costs"));
}

#[tokio::test]
async fn test_service_error_is_mapped() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/pricing/location-multipliers");
            then.status(400).json_body(json!({
                "code": "BAD_REQUEST",
                "message": "unknown location",
                "request_id": null
            }));
        })
        .await;

    let pipeline = common::pipeline(PriceAdjuster::disabled());
    let base = pipeline.run(&room(), None).await.unwrap();
    let request = LocationMultiplierRequest::new(&base.result, Location::Morocco);

    let err = client(&server)
        .location_multipliers(&request, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(msg) if msg == "unknown location"));
}

#[tokio::test]
async fn test_pipeline_applies_ai_multipliers() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/pricing/location-multipliers");
            then.status(200).json_body(json!({
                "multipliers": [{ "category": "finishing", "multiplier": 1.3 }]
            }));
        })
        .await;

    let base = common::pipeline(PriceAdjuster::disabled())
        .run(&room(), None)
        .await
        .unwrap();
    let adjusted = common::pipeline(adjuster(client(&server), Duration::from_secs(2)))
        .run(&room(), None)
        .await
        .unwrap();

    assert!(matches!(adjusted.adjustment, AdjustmentStatus::Applied { .. }));
    assert!(adjusted.result.pricing().total_cost > base.result.pricing().total_cost);
}

#[tokio::test]
async fn test_failing_ai_equals_skipped_ai() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/pricing/location-multipliers");
            then.status(500).body("upstream exploded");
        })
        .await;

    let skipped = common::pipeline(PriceAdjuster::disabled())
        .run(&room(), None)
        .await
        .unwrap();
    let failed = common::pipeline(adjuster(client(&server), Duration::from_secs(2)))
        .run(&room(), None)
        .await
        .unwrap();

    assert_eq!(failed.result, skipped.result);
    assert!(matches!(
        failed.adjustment,
        AdjustmentStatus::Degraded(DegradeReason::ServiceError(_))
    ));
}

#[tokio::test]
async fn test_malformed_ai_response_falls_back() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/pricing/location-multipliers");
            then.status(200).body("{\"multipliers\": \"lots\"}");
        })
        .await;

    let skipped = common::pipeline(PriceAdjuster::disabled())
        .run(&room(), None)
        .await
        .unwrap();
    let failed = common::pipeline(adjuster(client(&server), Duration::from_secs(2)))
        .run(&room(), None)
        .await
        .unwrap();

    assert_eq!(failed.result, skipped.result);
    assert_eq!(failed.adjustment.pricing_source(), "base_fallback");
}

#[tokio::test]
async fn test_slow_ai_times_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/pricing/location-multipliers");
            then.status(200)
                .delay(Duration::from_millis(500))
                .json_body(json!({ "multipliers": [{ "category": "cement", "multiplier": 1.5 }] }));
        })
        .await;

    let skipped = common::pipeline(PriceAdjuster::disabled())
        .run(&room(), None)
        .await
        .unwrap();
    let timed_out = common::pipeline(adjuster(client(&server), Duration::from_millis(50)))
        .run(&room(), None)
        .await
        .unwrap();

    assert_eq!(timed_out.result, skipped.result);
    assert_eq!(
        timed_out.adjustment,
        AdjustmentStatus::Degraded(DegradeReason::Timeout)
    );
}

#[tokio::test]
async fn test_health_check() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/health");
            then.status(200).json_body(json!({ "status": "ok" }));
        })
        .await;

    assert!(client(&server).health_check().await.is_ok());
}
