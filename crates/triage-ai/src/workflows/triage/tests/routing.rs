use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::workflows::triage::triage_router;

fn post(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/triage/assessments")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

#[tokio::test]
async fn assessment_route_returns_disposition() {
    let router = triage_router(Arc::new(service(0.2)));

    let response = router
        .oneshot(post(json!({
            "SpO2": 85,
            "age": 70,
            "blood_pressure": 95,
            "chest_pain": false,
            "mode_of_arrival": "walk_in"
        })))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["disposition"], "needs_er_evaluation");
    assert_eq!(body["score"]["applied_rules"][0]["rule_id"], "spo2_low");
}

#[tokio::test]
async fn out_of_range_vitals_are_unprocessable() {
    let router = triage_router(Arc::new(service(0.2)));

    let response = router
        .oneshot(post(json!({ "SpO2": 60, "age": 40 })))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response_json(response).await;
    assert!(body["error"]
        .as_str()
        .is_some_and(|message| message.contains("SpO2")));
}

#[tokio::test]
async fn non_numeric_attribute_is_unprocessable() {
    let router = triage_router(Arc::new(service(0.2)));

    let response = router
        .oneshot(post(json!({ "SpO2": 97, "age": "old" })))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn null_attribute_is_rejected_with_a_json_error() {
    let router = triage_router(Arc::new(service(0.2)));

    let response = router
        .oneshot(post(json!({ "SpO2": null, "age": 40 })))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response_json(response).await;
    assert!(body["error"]
        .as_str()
        .is_some_and(|message| message.starts_with("invalid request body")));
}

#[tokio::test]
async fn malformed_body_is_a_bad_request_with_a_json_error() {
    let router = triage_router(Arc::new(service(0.2)));

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/triage/assessments")
        .header("content-type", "application/json")
        .body(Body::from("{\"SpO2\": 97,"))
        .expect("request builds");
    let response = router.oneshot(request).await.expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn missing_model_is_service_unavailable_unless_overridden() {
    let service = Arc::new(service_without_model());

    let scored = triage_router(service.clone())
        .oneshot(post(json!({ "SpO2": 97, "age": 40 })))
        .await
        .expect("router responds");
    assert_eq!(scored.status(), StatusCode::SERVICE_UNAVAILABLE);

    let overridden = triage_router(service)
        .oneshot(post(json!({
            "SpO2": 97,
            "age": 40,
            "unilateral_weakness": 1,
            "trouble_speaking": true
        })))
        .await
        .expect("router responds");
    assert_eq!(overridden.status(), StatusCode::OK);
    let body = response_json(overridden).await;
    assert_eq!(body["er_probability"], 1.0);
    assert!(body["score"].is_null());
}

#[tokio::test]
async fn rules_handler_lists_both_tables() {
    let response =
        crate::workflows::triage::router::rules_handler(State(Arc::new(service(0.2)))).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["rules"].as_array().map(Vec::len), Some(19));
    assert_eq!(body["recommendations"].as_array().map(Vec::len), Some(5));
}
