//! HTTP-level tests driving the router in-process.

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{get, post_json, test_app};

fn room(quality: &str) -> Value {
    json!({
        "projectType": "room",
        "length": 4,
        "width": 5,
        "height": 3,
        "location": "Morocco",
        "qualityLevel": quality
    })
}

fn fields(body: &Value) -> Vec<String> {
    body["details"]
        .as_array()
        .map(|details| {
            details
                .iter()
                .filter_map(|d| d["field"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn test_health_reports_ai_disabled() {
    let (status, body) = get(test_app(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["ai_service"], "disabled");
}

#[tokio::test]
async fn test_morocco_room_scenario() {
    let (status, body) = post_json(test_app(), "/estimates", &room("STANDARD")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currency"], "MAD");
    assert!(!body["materials"].as_array().unwrap().is_empty());
    assert!(body["pricing"]["totalCost"].as_f64().unwrap() > 0.0);
    assert!(body["formattedTotal"].as_str().unwrap().ends_with(" DH"));
    assert!(body.get("budget").is_none());

    let line = &body["materials"][0];
    for key in ["name", "category", "quantity", "unit", "unitCost", "lineTotal"] {
        assert!(line.get(key).is_some(), "missing {}", key);
    }
}

#[tokio::test]
async fn test_luxury_room_costs_more_than_standard() {
    let (_, standard) = post_json(test_app(), "/estimates", &room("STANDARD")).await;
    let (_, luxury) = post_json(test_app(), "/estimates", &room("LUXURY")).await;

    let total = |body: &Value| body["pricing"]["totalCost"].as_f64().unwrap();
    assert!(total(&luxury) > total(&standard));
}

#[tokio::test]
async fn test_pricing_is_consistent() {
    let (_, body) = post_json(test_app(), "/estimates", &room("PREMIUM")).await;

    let pricing = &body["pricing"];
    let part = |key: &str| pricing[key].as_f64().unwrap();
    let line_sum: f64 = body["materials"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["lineTotal"].as_f64().unwrap())
        .sum();

    let tolerance = 1e-6 * part("totalCost");
    assert!((line_sum - part("materialCost")).abs() <= tolerance);
    let sum = part("materialCost") + part("laborCost") + part("equipmentCost") + part("contingency");
    assert!((sum - part("totalCost")).abs() <= tolerance);
}

#[tokio::test]
async fn test_zero_length_is_rejected() {
    let mut request = room("STANDARD");
    request["length"] = json!(0);
    let (status, body) = post_json(test_app(), "/estimates", &request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert_eq!(fields(&body), vec!["length"]);
    assert!(body.get("materials").is_none());
}

#[tokio::test]
async fn test_missing_fields_are_reported_together() {
    let (status, body) = post_json(
        test_app(),
        "/estimates",
        &json!({ "projectType": "castle", "length": 4, "width": 5 }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields = fields(&body);
    for field in ["projectType", "height", "location", "qualityLevel"] {
        assert!(fields.iter().any(|f| f == field), "missing {}", field);
    }
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let response = common::send(
        test_app(),
        axum::http::Request::builder()
            .method("POST")
            .uri("/estimates")
            .header("content-type", "application/json")
            .body(axum::body::Body::from("{\"projectType\": "))
            .unwrap(),
    )
    .await;

    assert_eq!(response.0, StatusCode::BAD_REQUEST);
    assert_eq!(response.1["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_currency_and_budget_options() {
    let mut request = room("STANDARD");
    request["currency"] = json!("eur");
    request["budget"] = json!(1_000_000);
    let (status, body) = post_json(test_app(), "/estimates", &request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currency"], "EUR");
    assert_eq!(body["budget"]["withinBudget"], true);

    request["currency"] = json!("XYZ");
    let (status, body) = post_json(test_app(), "/estimates", &request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(fields(&body), vec!["currency"]);
}

#[tokio::test]
async fn test_options_list_closed_sets() {
    let (status, body) = get(test_app(), "/estimates/options").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["projectTypes"].as_array().unwrap().len(), 5);
    assert_eq!(body["qualityLevels"].as_array().unwrap().len(), 4);
    assert!(body["locations"]
        .as_array()
        .unwrap()
        .iter()
        .any(|l| l["name"] == "Morocco" && l["defaultCurrency"] == "MAD"));
}

#[tokio::test]
async fn test_brand_recommendations() {
    let (status, body) = get(
        test_app(),
        "/brands/recommendations?materialName=Cement%20CPJ%2045&location=Morocco&quality=standard",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"], "cement");
    let recs = body["recommendations"].as_array().unwrap();
    assert!(!recs.is_empty());
    assert_eq!(recs[0]["rank"], 1);
    assert_eq!(recs[0]["qualityLevel"], "standard");
}

#[tokio::test]
async fn test_brand_recommendations_without_quality() {
    let (status, body) = get(
        test_app(),
        "/brands/recommendations?materialName=Wall%20paint&location=MA",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("quality").is_none());
    let multipliers: Vec<f64> = body["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["priceMultiplier"].as_f64().unwrap())
        .collect();
    assert!(!multipliers.is_empty());
    assert!(multipliers.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_unknown_material_has_no_brands() {
    let (status, body) = get(
        test_app(),
        "/brands/recommendations?materialName=Door%20hinges&location=France",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"], "other");
    assert!(body["recommendations"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_brand_recommendations_require_location() {
    let (status, body) = get(test_app(), "/brands/recommendations?materialName=Sand").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(fields(&body), vec!["location"]);
}

#[tokio::test]
async fn test_currency_list_and_convert() {
    let (status, body) = get(test_app(), "/currencies").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["base"], "USD");
    assert_eq!(body["currencies"].as_array().unwrap().len(), 7);

    let (status, body) = get(test_app(), "/currencies/convert?amount=100&from=usd&to=MAD").await;
    assert_eq!(status, StatusCode::OK);
    assert!((body["converted"].as_f64().unwrap() - 995.0).abs() < 1e-9);
    assert_eq!(body["formatted"], "995.00 DH");
    assert_eq!(body["from"], "USD");
}

#[tokio::test]
async fn test_convert_rejects_unknown_currency() {
    let (status, body) = get(test_app(), "/currencies/convert?amount=1&from=USD&to=ZZZ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(fields(&body), vec!["to"]);

    let (status, body) = get(test_app(), "/currencies/convert?amount=abc&from=USD&to=EUR").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let response = tower::ServiceExt::oneshot(
        test_app(),
        axum::http::Request::builder()
            .uri("/health")
            .header("x-request-id", "abc-123")
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(response.headers()["x-request-id"], "abc-123");
}

#[tokio::test]
async fn test_error_body_carries_request_id() {
    let mut request = room("STANDARD");
    request["length"] = json!(0);
    let (status, body) = common::send(
        test_app(),
        axum::http::Request::builder()
            .method("POST")
            .uri("/estimates")
            .header("content-type", "application/json")
            .header("x-request-id", "req-err-7")
            .body(axum::body::Body::from(request.to_string()))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert_eq!(body["request_id"], "req-err-7");
    assert_eq!(fields(&body), vec!["length"]);
}

#[tokio::test]
async fn test_generated_request_id_reaches_error_body() {
    let (status, body) = get(test_app(), "/brands/recommendations?materialName=Sand").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["request_id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn test_success_body_has_no_request_id() {
    let (status, body) = post_json(test_app(), "/estimates", &room("STANDARD")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("request_id").is_none());
}
