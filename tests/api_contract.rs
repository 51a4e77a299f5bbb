//! HTTP-level contract tests for the registration API.
//!
//! Runs the router in-process against the in-memory submission store.

#![cfg(feature = "server")]

use std::sync::Arc;

use axum::body::Body;
use http_body_util::BodyExt;
use hyper::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use udyam::api::build_router;
use udyam_core::memory::InMemorySubmissionStore;
use udyam_core::ports::SubmissionStore;
use udyam_core::{RegistrationService, SchemaProvider};

// ── Test app builder ───────────────────────────────────────────

fn build_test_app() -> (axum::Router, Arc<InMemorySubmissionStore>) {
    let store = Arc::new(InMemorySubmissionStore::new());
    let schema = Arc::new(SchemaProvider::builtin().unwrap());
    let service = Arc::new(RegistrationService::new(schema, store.clone()));
    (build_router(service), store)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(
        |_| json!({ "raw": String::from_utf8_lossy(&bytes).to_string() }),
    )
}

fn valid_step_two() -> Value {
    json!({
        "step": 2,
        "data": {
            "pan": "ABCDE1234F",
            "pincode": "411001",
            "state": "Maharashtra",
            "city": "Pune"
        }
    })
}

// ── Tests ───────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_ok() {
    let (app, _) = build_test_app();
    let resp = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn schema_matches_builtin_and_is_stable() {
    let (app, _) = build_test_app();
    let first = body_json(app.clone().oneshot(get("/api/schema")).await.unwrap()).await;
    let second = body_json(app.oneshot(get("/api/schema")).await.unwrap()).await;
    assert_eq!(first, second);

    let steps = first["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0]["title"], "Aadhaar & OTP Validation");
    assert_eq!(steps[0]["fields"][0]["name"], "aadhaar");
    assert_eq!(steps[0]["fields"][1]["type"], "tel");
    // absent optionals are omitted, not null
    assert!(steps[0]["fields"][2].get("pattern").is_none());
}

#[tokio::test]
async fn validate_accepts_partial_pan() {
    let (app, _) = build_test_app();
    let resp = app
        .oneshot(post_json(
            "/api/validate",
            &json!({ "step": 2, "data": { "pan": "ABCDE1234F" }, "mode": "partial" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({ "ok": true }));
}

#[tokio::test]
async fn validate_defaults_to_complete_mode() {
    let (app, _) = build_test_app();
    let resp = app
        .oneshot(post_json(
            "/api/validate",
            &json!({ "step": 2, "data": { "pan": "ABCDE1234F" } }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Validation failed");
    assert_eq!(body["details"]["city"], "City is required");
    assert!(body["details"].get("pan").is_none());
}

#[tokio::test]
async fn validate_rejects_bad_pan_at_boundary() {
    let (app, _) = build_test_app();
    let resp = app
        .oneshot(post_json(
            "/api/validate",
            &json!({ "step": 2, "data": { "pan": "ABC123" } }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Invalid payload");
    assert!(body["details"]["fieldErrors"]["data.pan"].is_array());
}

#[tokio::test]
async fn validate_rejects_mobile_format_via_schema() {
    let (app, _) = build_test_app();
    let resp = app
        .oneshot(post_json(
            "/api/validate",
            &json!({
                "step": 1,
                "data": { "aadhaar": "234567890123", "mobile": "12345" }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Validation failed");
    assert_eq!(
        body["details"]["mobile"],
        "Mobile Number (linked to Aadhaar) format is invalid"
    );
}

#[tokio::test]
async fn malformed_payloads_are_rejected() {
    for body in [
        json!({ "step": 3, "data": {} }),
        json!({ "step": 1 }),
        json!({ "step": 1, "data": { "otp": "12" } }),
        json!({ "step": 1, "data": { "mobile": 9876543210u64 } }),
        json!("not an object"),
    ] {
        let (app, _) = build_test_app();
        let resp = app.oneshot(post_json("/api/submit", &body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body {body}");
        assert_eq!(body_json(resp).await["error"], "Invalid payload");
    }
}

#[tokio::test]
async fn unparseable_json_is_invalid_payload() {
    let (app, _) = build_test_app();
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/validate")
                .header("content-type", "application/json")
                .body(Body::from("{ not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Invalid payload");
    assert_eq!(body["details"]["formErrors"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn submit_persists_and_round_trips_raw_json() {
    let (app, store) = build_test_app();
    let mut payload = valid_step_two();
    payload["data"]["source"] = json!("walk-in");
    payload["data"]["consent"] = json!(true);

    let resp = app.oneshot(post_json("/api/submit", &payload)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let id: uuid::Uuid = serde_json::from_value(body["id"].clone()).unwrap();

    let record = store.get(id).await.unwrap().expect("record stored");
    assert_eq!(record.step, 2);
    assert_eq!(record.state.as_deref(), Some("Maharashtra"));

    assert_eq!(Value::Object(record.submitted_data().unwrap()), payload["data"]);
}

#[tokio::test]
async fn submit_checks_values_carried_from_earlier_step() {
    let (app, store) = build_test_app();
    let mut payload = valid_step_two();
    payload["data"]["mobile"] = json!("12345");

    let resp = app.oneshot(post_json("/api/submit", &payload)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Validation failed");
    assert_eq!(
        body["details"]["mobile"],
        "Mobile Number (linked to Aadhaar) format is invalid"
    );
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn whole_number_float_step_is_accepted() {
    let (app, store) = build_test_app();
    let mut payload = valid_step_two();
    payload["step"] = json!(2.0);

    let resp = app.oneshot(post_json("/api/submit", &payload)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn submit_with_validation_failure_writes_nothing() {
    let (app, store) = build_test_app();
    let resp = app
        .oneshot(post_json(
            "/api/submit",
            &json!({ "step": 2, "data": { "pan": "ABCDE1234F", "pincode": "011001" } }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Validation failed");
    assert_eq!(body["details"]["pincode"], "PIN Code format is invalid");
    assert_eq!(body["details"]["state"], "State is required");
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn each_submit_gets_a_new_id() {
    let (app, store) = build_test_app();
    let a = body_json(
        app.clone()
            .oneshot(post_json("/api/submit", &valid_step_two()))
            .await
            .unwrap(),
    )
    .await;
    let b = body_json(
        app.oneshot(post_json("/api/submit", &valid_step_two()))
            .await
            .unwrap(),
    )
    .await;
    assert_ne!(a["id"], b["id"]);
    assert_eq!(store.count().await.unwrap(), 2);
}
