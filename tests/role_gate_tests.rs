mod common;

use axum::http::StatusCode;
use sea_orm::{EntityTrait, PaginatorTrait};
use uuid::Uuid;

use fleetbid_backend::entities::prelude::Profiles;

use crate::common::{send, set_role, test_app};

/// No identity header means no access to anything under /api
#[tokio::test]
async fn missing_identity_is_unauthorized() {
    let (app, _db) = test_app().await;

    let (status, json) = send(&app, "GET", "/api/profile", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(json["error"].as_str().unwrap().contains("identity"));
}

#[tokio::test]
async fn profile_is_created_on_first_role_write() {
    let (app, _db) = test_app().await;
    let user = Uuid::new_v4();

    let (status, json) = send(&app, "GET", "/api/profile", Some(user), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].is_string());

    set_role(&app, user, "investor").await;

    let (status, json) = send(&app, "GET", "/api/profile", Some(user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], user.to_string());
    assert_eq!(json["role"], "investor");
}

/// Switching role updates the one row, it never creates a second profile
#[tokio::test]
async fn role_switch_keeps_one_row_per_identity() {
    let (app, db) = test_app().await;
    let user = Uuid::new_v4();

    set_role(&app, user, "investor").await;
    set_role(&app, user, "entrepreneur").await;

    let (status, json) = send(&app, "GET", "/api/profile", Some(user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], user.to_string());
    assert_eq!(json["role"], "entrepreneur");

    let rows = Profiles::find().count(&db).await.unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn unknown_role_is_rejected() {
    let (app, _db) = test_app().await;
    let user = Uuid::new_v4();

    let (status, _) = send(
        &app,
        "PUT",
        "/api/profile/role",
        Some(user),
        Some(serde_json::json!({ "role": "landlord" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

/// Role-gated endpoints refuse the wrong role with 403
#[tokio::test]
async fn role_gates_write_operations() {
    let (app, _db) = test_app().await;
    let entrepreneur = Uuid::new_v4();
    set_role(&app, entrepreneur, "entrepreneur").await;

    // Publishing is investor-only
    let (status, _) = send(
        &app,
        "POST",
        "/api/listings",
        Some(entrepreneur),
        Some(serde_json::json!({
            "make": "Toyota",
            "model": "Hilux",
            "year": 2022,
            "base_amount": 25000,
            "base_term_months": 24,
            "base_installment": 1200,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The review queue is admin-only
    let (status, _) = send(&app, "GET", "/api/documents", Some(entrepreneur), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // No role at all is also refused
    let roleless = Uuid::new_v4();
    let (status, _) = send(&app, "GET", "/api/listings/mine", Some(roleless), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn full_name_survives_role_switch() {
    let (app, _db) = test_app().await;
    let user = Uuid::new_v4();

    let (status, _) = send(
        &app,
        "PUT",
        "/api/profile/role",
        Some(user),
        Some(serde_json::json!({ "role": "entrepreneur", "full_name": "Maria Torres" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    set_role(&app, user, "investor").await;

    let (_, json) = send(&app, "GET", "/api/profile", Some(user), None).await;
    assert_eq!(json["full_name"], "Maria Torres");
    assert_eq!(json["role"], "investor");
}
