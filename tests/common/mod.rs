//! Shared harness for the integration tests: a fresh in-memory database
//! with the full schema, the real router, and small request helpers.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use fleetbid_backend::services::{otp::OtpService, sms::SmsService};
use fleetbid_backend::{AppState, router};

/// Fresh in-memory database with all migrations applied.
///
/// A single pooled connection, because every SQLite `::memory:`
/// connection is its own database.
pub async fn setup_test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options.max_connections(1).min_connections(1);

    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");

    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// The real application router over a fresh database.
///
/// Returns the database handle too so tests can inspect rows directly.
pub async fn test_app() -> (Router, DatabaseConnection) {
    let db = setup_test_db().await;

    let state = AppState {
        db: db.clone(),
        sms: SmsService::disabled(),
        otp: OtpService::new(600),
    };

    (router(state), db)
}

/// Issue one request and decode the JSON body (Null when empty)
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<Uuid>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");

    if let Some(user) = user {
        builder = builder.header("x-user-id", user.to_string());
    }

    let request = builder
        .body(match body {
            Some(value) => Body::from(serde_json::to_vec(&value).unwrap()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

/// Give an identity a role via the real endpoint
pub async fn set_role(app: &Router, user: Uuid, role: &str) {
    let (status, _) = send(
        app,
        "PUT",
        "/api/profile/role",
        Some(user),
        Some(serde_json::json!({ "role": role })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "failed to set role {}", role);
}

/// Publish a listing for the investor and return its id and vehicle id
pub async fn publish_listing(app: &Router, investor: Uuid) -> (Uuid, Uuid) {
    let (status, json) = send(
        app,
        "POST",
        "/api/listings",
        Some(investor),
        Some(serde_json::json!({
            "plate": "ABC-123",
            "make": "Toyota",
            "model": "Hilux",
            "year": 2022,
            "base_amount": 25000,
            "base_term_months": 24,
            "base_installment": 1200,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "failed to publish: {}", json);

    let listing_id = Uuid::parse_str(json["id"].as_str().unwrap()).unwrap();
    let vehicle_id = Uuid::parse_str(json["vehicle"]["id"].as_str().unwrap()).unwrap();
    (listing_id, vehicle_id)
}

/// Submit one document for the vehicle
pub async fn submit_document(app: &Router, investor: Uuid, vehicle_id: Uuid, doc_type: &str) {
    let (status, json) = send(
        app,
        "PUT",
        &format!("/api/vehicles/{}/documents", vehicle_id),
        Some(investor),
        Some(serde_json::json!({
            "doc_type": doc_type,
            "file_path": format!("{}/{}.pdf", vehicle_id, doc_type),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "failed to submit {}: {}", doc_type, json);
}

/// Admin decision on a document, returning the review response
pub async fn review_document(
    app: &Router,
    admin: Uuid,
    document_id: &str,
    decision: &str,
) -> Value {
    let (status, json) = send(
        app,
        "PUT",
        &format!("/api/documents/{}/review", document_id),
        Some(admin),
        Some(serde_json::json!({ "decision": decision })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "review failed: {}", json);
    json
}

/// Pending document ids for a vehicle keyed by doc type, via the admin queue
pub async fn pending_documents(app: &Router, admin: Uuid, vehicle_id: Uuid) -> Value {
    let (status, json) = send(
        app,
        "GET",
        &format!("/api/documents?vehicle_id={}", vehicle_id),
        Some(admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    json
}

/// Find the id of a pending document of the given type
pub fn document_id_for(queue: &Value, doc_type: &str) -> String {
    queue["documents"]
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["doc_type"] == doc_type)
        .unwrap_or_else(|| panic!("no pending {} document", doc_type))["id"]
        .as_str()
        .unwrap()
        .to_string()
}
