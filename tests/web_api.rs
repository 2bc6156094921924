//! HTTP API tests against an in-memory router

use std::io::Write;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::Router;
use serde_json::{json, Value};
use tempfile::NamedTempFile;
use tower::ServiceExt;

use cropwater::{load_model, web::build_router, WaterAdvisor};

/// Router backed by a constant linear model predicting 4.321 mm/day.
fn create_test_app() -> (Router, NamedTempFile) {
    let spec = json!({
        "model_id": "constant_v1",
        "bias": 4.321,
        "weights": vec![0.0; 12],
    });
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(spec.to_string().as_bytes()).unwrap();

    let advisor = Arc::new(WaterAdvisor::new(load_model(file.path()).unwrap()));
    (build_router(advisor), file)
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn predict_returns_formatted_prediction_and_suggestions() {
    let (app, _model) = create_test_app();

    let (status, body) = post_json(
        app,
        "/api/predict",
        json!({
            "soil_type": "Sandy",
            "crop_type": "Maize",
            "growth_stage": "Flowering",
            "irrigation_method": "Sprinkler",
            "temperature": 31.0,
            "humidity": 40.0,
            "wind_speed": 3.2,
            "evapotranspiration": 8.5,
            "rainfall": 12.0,
            "soil_moisture": 14.0,
            "water_retention": 28.0,
            "drainage_properties": 4
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_id"], "constant_v1");
    assert_eq!(body["formatted"], "4.32 mm/day");
    assert_eq!(body["balanced"], false);

    let rules: Vec<&str> = body["suggestions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["rule"].as_str().unwrap())
        .collect();
    assert_eq!(rules, vec!["sandy_soil", "high_evapotranspiration", "low_soil_moisture"]);

    let features: Vec<f64> = serde_json::from_value(body["features"].clone()).unwrap();
    assert_eq!(
        features,
        vec![0.0, 2.0, 2.0, 31.0, 40.0, 3.2, 8.5, 12.0, 14.0, 28.0, 4.0, 1.0]
    );
}

#[tokio::test]
async fn versioned_alias_accepts_partial_input() {
    let (app, _model) = create_test_app();

    let (status, body) = post_json(app, "/v1/predict", json!({ "soil_type": "loamy" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balanced"], true);
    assert_eq!(
        body["messages"],
        json!(["All parameters are well-balanced for optimal water usage!"])
    );
}

#[tokio::test]
async fn unknown_category_is_a_bad_request() {
    let (app, _model) = create_test_app();

    let (status, body) = post_json(app, "/api/predict", json!({ "crop_type": "Barley" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Barley"));
}

#[tokio::test]
async fn out_of_domain_value_is_a_bad_request() {
    let (app, _model) = create_test_app();

    let (status, body) = post_json(app, "/api/advise", json!({ "rainfall": 250.0 })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("rainfall"));
}

#[tokio::test]
async fn mistyped_fields_are_json_bad_requests() {
    let bodies = [
        ("/api/predict", json!({ "temperature": "hot" }), "temperature"),
        ("/api/predict", json!({ "drainage_properties": 2.5 }), "drainage_properties"),
        ("/api/predict", json!({ "soil_type": null }), "soil_type"),
        ("/api/advise", json!({ "humidity": [50] }), "humidity"),
    ];

    for (uri, body, field) in bodies {
        let (app, _model) = create_test_app();
        let (status, response) = post_json(app, uri, body.clone()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri} {body}");
        let message = response["error"].as_str().unwrap();
        assert!(message.starts_with("Invalid input"), "{message}");
        assert!(message.contains(field), "{message}");
    }
}

#[tokio::test]
async fn non_json_body_is_a_bad_request() {
    let (app, _model) = create_test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/advise")
        .header("content-type", "application/json")
        .body(Body::from("soil_type=Sandy"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn advise_runs_rules_only() {
    let (app, _model) = create_test_app();

    let (status, body) = post_json(
        app,
        "/api/advise",
        json!({ "soil_type": "Clay", "drainage_properties": 1 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balanced"], false);
    assert_eq!(body["suggestions"][0]["rule"], "poor_drainage");
    assert!(body.get("features").is_none());
}

#[tokio::test]
async fn schema_status_and_health_endpoints() {
    let (app, _model) = create_test_app();

    let (status, schema) = get_json(app.clone(), "/api/schema").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(schema["feature_columns"].as_array().unwrap().len(), 12);

    let (status, info) = get_json(app.clone(), "/api/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["model_id"], "constant_v1");
    assert_eq!(info["model_format"], "linear");

    let (status, health) = get_json(app.clone(), "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "ok");

    let (status, ready) = get_json(app, "/readyz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ready["ready"], true);
}
