use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::scoring::router::{health_handler, predict_handler};
use crate::scoring::{PredictionService, SchemaVersion};

fn post_predict(body: &Value) -> Request<Body> {
    Request::post("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).expect("serializes")))
        .expect("request builds")
}

#[tokio::test]
async fn health_reports_model_state() {
    let service = Arc::new(PredictionService::unavailable());
    let axum::Json(status) = health_handler(State(service)).await;
    assert_eq!(status.status, "Active");
    assert!(!status.model_loaded);

    let loaded = Arc::new(PredictionService::new(logistic_v2_bundle()));
    let axum::Json(status) = health_handler(State(loaded)).await;
    assert!(status.model_loaded);
}

#[tokio::test]
async fn root_and_health_routes_agree() {
    for uri in ["/", "/health"] {
        let response = router_with(PredictionService::unavailable())
            .oneshot(Request::get(uri).body(Body::empty()).expect("request builds"))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        assert_eq!(payload, json!({ "status": "Active", "model_loaded": false }));
    }
}

#[tokio::test]
async fn predict_without_model_returns_503() {
    let response = router_with(PredictionService::unavailable())
        .oneshot(post_predict(&v1_body()))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let payload = read_json_body(response).await;
    assert_eq!(payload, json!({ "detail": "Model not loaded on server" }));
}

#[tokio::test]
async fn predict_returns_result_payload() {
    let response = router_with(PredictionService::new(logistic_v2_bundle()))
        .oneshot(post_predict(&v2_body()))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok()),
        Some("*")
    );
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], json!("Success"));
    assert_eq!(payload["decision"], json!("Approved"));
    assert_eq!(payload["probability"], json!(0.8808));
    assert_eq!(payload["threshold"], json!(0.87));
    assert!(payload.get("input_summary").is_none());
}

#[tokio::test]
async fn first_generation_payload_echoes_input() {
    let classifier = RecordingClassifier::returning(0.25);
    let service = PredictionService::new(bundle_with(
        SchemaVersion::V1,
        classifier,
        None,
        &V1_FEATURES,
    ));

    let response = predict_handler(State(Arc::new(service)), Ok(axum::Json(v1_body()))).await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["decision"], json!("Rejected"));
    assert_eq!(payload["input_summary"]["Credit_Score"], json!(700));
    assert_eq!(payload["input_summary"]["Loan_Amount"], json!(200000.0));
}

#[tokio::test]
async fn arithmetic_failure_returns_500_detail() {
    let service = PredictionService::new(bundle_with(
        SchemaVersion::V1,
        RecordingClassifier::returning(0.9),
        None,
        &V1_FEATURES,
    ));
    let mut body = v1_body();
    body["Loan_Amount"] = json!(0);

    let response = router_with(service)
        .oneshot(post_predict(&body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json_body(response).await;
    let detail = payload["detail"].as_str().unwrap_or_default();
    assert!(detail.contains("Loan_Amount"), "detail was {detail}");
}

#[tokio::test]
async fn schema_mismatch_returns_500_with_missing_names() {
    let service = PredictionService::new(bundle_with(
        SchemaVersion::V1,
        RecordingClassifier::returning(0.9),
        None,
        &["Age", "DTI_Ratio"],
    ));

    let response = router_with(service)
        .oneshot(post_predict(&v1_body()))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload["detail"],
        json!("missing engineered features: DTI_Ratio")
    );
}

#[tokio::test]
async fn body_from_wrong_generation_is_unprocessable() {
    let response = router_with(PredictionService::new(logistic_v2_bundle()))
        .oneshot(post_predict(&v1_body()))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["detail"]
        .as_str()
        .unwrap_or_default()
        .contains("Emp_Status_Num"));
}

#[tokio::test]
async fn non_json_body_is_unprocessable() {
    let request = Request::post("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("request builds");

    let response = router_with(PredictionService::new(logistic_v2_bundle()))
        .oneshot(request)
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(read_json_body(response).await.get("detail").is_some());
}

#[tokio::test]
async fn preflight_is_answered_without_handler() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/predict")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .expect("request builds");

    let response = router_with(PredictionService::unavailable())
        .oneshot(request)
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let header_text = |name: header::HeaderName| {
        response
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    assert_eq!(
        header_text(header::ACCESS_CONTROL_ALLOW_ORIGIN).as_deref(),
        Some("*")
    );
    assert_eq!(
        header_text(header::ACCESS_CONTROL_ALLOW_HEADERS).as_deref(),
        Some("content-type")
    );
}
