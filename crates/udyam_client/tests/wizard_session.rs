//! End-to-end client tests against an in-process registration server and a
//! stub PIN code service, both bound to ephemeral ports.

use std::sync::Arc;

use axum::{extract::Path, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use udyam::api::build_router;
use udyam_client::session::SUBMIT_FAILED;
use udyam_client::{ClientError, PostalLookup, PostalPincodeClient, RegistrationClient, WizardSession};
use udyam_core::memory::InMemorySubmissionStore;
use udyam_core::payload::SubmissionPayload;
use udyam_core::ports::SubmissionStore;
use udyam_core::{FormData, RegistrationService, SchemaProvider};

// ── Fixtures ────────────────────────────────────────────────────

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn spawn_backend() -> (RegistrationClient, Arc<InMemorySubmissionStore>) {
    let store = Arc::new(InMemorySubmissionStore::new());
    let schema = Arc::new(SchemaProvider::builtin().unwrap());
    let service = Arc::new(RegistrationService::new(schema, store.clone()));
    let base = serve(build_router(service)).await;
    (RegistrationClient::new(base), store)
}

async fn pincode_found(Path(pin): Path<String>) -> Json<Value> {
    if pin == "411001" {
        Json(json!([{
            "Status": "Success",
            "PostOffice": [{ "Name": "Shivajinagar", "State": "Maharashtra", "Block": "Haveli", "District": "Pune" }]
        }]))
    } else {
        Json(json!([{ "Status": "Error", "PostOffice": null }]))
    }
}

async fn spawn_postal_stub() -> Arc<dyn PostalLookup> {
    let app = Router::new().route("/pincode/:pin", get(pincode_found));
    Arc::new(PostalPincodeClient::with_base_url(serve(app).await))
}

async fn spawn_failing_postal_stub() -> Arc<dyn PostalLookup> {
    let app = Router::new().route(
        "/pincode/:pin",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream down") }),
    );
    Arc::new(PostalPincodeClient::with_base_url(serve(app).await))
}

async fn fill_step_one(session: &mut WizardSession) {
    session.set_value("aadhaar", "234567890123").await;
    session.set_value("mobile", "9876543210").await;
    assert!(session.next());
}

// ── Tests ───────────────────────────────────────────────────────

#[tokio::test]
async fn health_and_schema_round_trip() {
    let (client, _) = spawn_backend().await;
    assert!(client.health().await.unwrap());

    let schema = client.get_schema().await.unwrap();
    assert_eq!(schema, udyam_core::schema::builtin_schema());
}

#[tokio::test]
async fn wizard_prefills_from_pincode_and_submits() {
    let (client, store) = spawn_backend().await;
    let postal = spawn_postal_stub().await;
    let mut session = WizardSession::start(client, postal).await.unwrap();

    fill_step_one(&mut session).await;
    session.set_value("pan", "ABCDE1234F").await;
    session.set_value("pincode", "411001").await;

    assert_eq!(session.wizard().value("state"), "Maharashtra");
    assert_eq!(session.wizard().value("city"), "Haveli");
    assert!(session.wizard().is_last_step());

    let id = session.submit().await.unwrap();
    assert!(session.wizard().is_submitted());
    assert!(!session.is_loading());

    let record = store.get(id).await.unwrap().unwrap();
    assert_eq!(record.step, 2);
    assert_eq!(record.aadhaar.as_deref(), Some("234567890123"));
    assert_eq!(record.pan.as_deref(), Some("ABCDE1234F"));
    assert_eq!(record.city.as_deref(), Some("Haveli"));
}

#[tokio::test]
async fn unknown_pincode_leaves_fields_for_manual_entry() {
    let (client, _) = spawn_backend().await;
    let postal = spawn_postal_stub().await;
    let mut session = WizardSession::start(client, postal).await.unwrap();

    fill_step_one(&mut session).await;
    session.set_value("pincode", "110001").await;

    assert_eq!(session.wizard().value("state"), "");
    assert_eq!(session.wizard().value("city"), "");
}

#[tokio::test]
async fn lookup_failure_does_not_block_submission() {
    let (client, store) = spawn_backend().await;
    let postal = spawn_failing_postal_stub().await;
    let mut session = WizardSession::start(client, postal).await.unwrap();

    fill_step_one(&mut session).await;
    session.set_value("pan", "ABCDE1234F").await;
    session.set_value("pincode", "411001").await;
    assert_eq!(session.wizard().value("state"), "");

    session.set_value("state", "Maharashtra").await;
    session.set_value("city", "Pune").await;

    session.submit().await.unwrap();
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn incomplete_step_is_not_sent() {
    let (client, store) = spawn_backend().await;
    let postal = spawn_postal_stub().await;
    let mut session = WizardSession::start(client, postal).await.unwrap();

    session.set_value("aadhaar", "234567890123").await;

    let err = session.submit().await.unwrap_err();
    assert!(matches!(err, ClientError::StepIncomplete));
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn short_otp_is_caught_before_leaving_first_step() {
    let (client, store) = spawn_backend().await;
    let postal = spawn_postal_stub().await;
    let mut session = WizardSession::start(client, postal).await.unwrap();

    session.set_value("aadhaar", "234567890123").await;
    session.set_value("mobile", "9876543210").await;
    session.set_value("otp", "12").await;

    assert_eq!(session.wizard().error("otp"), Some("OTP format is invalid"));
    assert!(!session.next());
    assert!(matches!(
        session.submit().await.unwrap_err(),
        ClientError::StepIncomplete
    ));
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn server_rejection_sets_generic_failure() {
    let (client, store) = spawn_backend().await;
    let postal = spawn_postal_stub().await;
    let mut session = WizardSession::start(client, postal).await.unwrap();

    fill_step_one(&mut session).await;
    session.set_value("pan", "ABCDE1234F").await;
    session.set_value("pincode", "411001").await;
    // edited after leaving step 1, so only the server sees it
    session.set_value("mobile", "12345").await;

    let err = session.submit().await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 400, .. }));
    assert_eq!(session.failure(), Some(SUBMIT_FAILED));
    assert!(!session.wizard().is_submitted());
    assert_eq!(store.count().await.unwrap(), 0);

    session.start_over();
    assert_eq!(session.failure(), None);
}

#[tokio::test]
async fn start_over_returns_to_first_step() {
    let (client, _) = spawn_backend().await;
    let postal = spawn_postal_stub().await;
    let mut session = WizardSession::start(client, postal).await.unwrap();

    fill_step_one(&mut session).await;
    session.start_over();

    assert_eq!(session.wizard().active_step(), 1);
    assert!(session.wizard().form_data().is_empty());
}

#[tokio::test]
async fn rejected_payload_surfaces_status_and_body() {
    let (client, store) = spawn_backend().await;

    let mut data = FormData::new();
    data.insert("pan".into(), "ABCDE1234F".into());
    let payload = SubmissionPayload::new(2, data);

    match client.validate(&payload).await.unwrap_err() {
        ClientError::Status { status, body } => {
            assert_eq!(status, 400);
            let body: Value = serde_json::from_str(&body).unwrap();
            assert_eq!(body["error"], "Validation failed");
            assert_eq!(body["details"]["city"], "City is required");
        }
        other => panic!("expected status error, got {other:?}"),
    }

    let err = client.submit(&payload).await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 400, .. }));
    assert_eq!(store.count().await.unwrap(), 0);
}
