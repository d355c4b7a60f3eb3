#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use estimator_backend::{
    app::{create_app, AppState},
    config::Settings,
    estimation::{
        BrandCatalog, BrandResolver, CurrencyService, EstimationPipeline, PriceAdjuster,
        TakeoffEngine, TakeoffTable,
    },
};

pub fn test_settings() -> Settings {
    Settings::from_lookup(|key| match key {
        "AI_ADJUSTMENT_ENABLED" => Some("false".to_string()),
        _ => None,
    })
    .unwrap()
}

pub fn pipeline(adjuster: PriceAdjuster) -> EstimationPipeline {
    EstimationPipeline::new(
        TakeoffEngine::new(TakeoffTable::bundled().unwrap(), None),
        BrandResolver::new(BrandCatalog::bundled().unwrap()),
        CurrencyService::default(),
        adjuster,
    )
}

pub fn test_app() -> Router {
    create_app(AppState::new(
        test_settings(),
        pipeline(PriceAdjuster::disabled()),
        None,
    ))
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(
        app,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
}

pub async fn post_json(app: Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}
