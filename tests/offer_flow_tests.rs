mod common;

use axum::{Router, http::StatusCode};
use chrono::{Duration, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, sea_query::Expr,
};
use uuid::Uuid;

use fleetbid_backend::entities::phone_otps;
use fleetbid_backend::entities::prelude::PhoneOtps;

use crate::common::{
    document_id_for, pending_documents, publish_listing, review_document, send, set_role,
    submit_document, test_app,
};

/// Publish and drive a listing to `active` through the document gate
async fn active_listing(app: &Router, investor: Uuid, admin: Uuid) -> (Uuid, Uuid) {
    let (listing_id, vehicle_id) = publish_listing(app, investor).await;
    submit_document(app, investor, vehicle_id, "property_card").await;
    submit_document(app, investor, vehicle_id, "vehicle_photo").await;

    let queue = pending_documents(app, admin, vehicle_id).await;
    review_document(app, admin, &document_id_for(&queue, "property_card"), "approved").await;
    let review =
        review_document(app, admin, &document_id_for(&queue, "vehicle_photo"), "approved").await;
    assert_eq!(review["activated"], true);

    (listing_id, vehicle_id)
}

/// Latest issued code for a phone, read straight from the table
async fn latest_code(db: &DatabaseConnection, phone: &str) -> String {
    PhoneOtps::find()
        .filter(phone_otps::Column::Phone.eq(phone))
        .filter(phone_otps::Column::Consumed.eq(false))
        .order_by_desc(phone_otps::Column::CreatedAt)
        .one(db)
        .await
        .unwrap()
        .expect("no live otp code")
        .code
}

/// Register DNI + phone and confirm the phone over the OTP round trip
async fn verify_entrepreneur(app: &Router, db: &DatabaseConnection, user: Uuid, phone: &str) {
    let (status, json) = send(
        app,
        "POST",
        "/api/verification",
        Some(user),
        Some(serde_json::json!({ "dni": "12345678", "phone": phone })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "verification upsert failed: {}", json);

    let (status, _) = send(app, "POST", "/api/verification/otp/send", Some(user), None).await;
    assert_eq!(status, StatusCode::OK);

    let code = latest_code(db, phone).await;
    let (status, json) = send(
        app,
        "POST",
        "/api/verification/otp/verify",
        Some(user),
        Some(serde_json::json!({ "code": code })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "otp verify failed: {}", json);
    assert_eq!(json["phone_verified"], true);
}

#[tokio::test]
async fn verification_round_trip() {
    let (app, db) = test_app().await;
    let user = Uuid::new_v4();
    set_role(&app, user, "entrepreneur").await;

    // Nothing registered yet
    let (status, _) = send(&app, "GET", "/api/verification", Some(user), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Bad DNI is refused
    let (status, _) = send(
        &app,
        "POST",
        "/api/verification",
        Some(user),
        Some(serde_json::json!({ "dni": "123", "phone": "+51987654321" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = send(
        &app,
        "POST",
        "/api/verification",
        Some(user),
        Some(serde_json::json!({ "dni": "12345678", "phone": "+51987654321" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["phone_verified"], false);
    assert_eq!(json["status"], "pending");

    let (status, _) = send(&app, "POST", "/api/verification/otp/send", Some(user), None).await;
    assert_eq!(status, StatusCode::OK);

    let code = latest_code(&db, "+51987654321").await;

    // A wrong code does not verify
    let wrong = if code == "000000" { "000001" } else { "000000" };
    let (status, _) = send(
        &app,
        "POST",
        "/api/verification/otp/verify",
        Some(user),
        Some(serde_json::json!({ "code": wrong })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, json) = send(
        &app,
        "POST",
        "/api/verification/otp/verify",
        Some(user),
        Some(serde_json::json!({ "code": code })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["phone_verified"], true);

    // A consumed code cannot be replayed
    let (status, _) = send(
        &app,
        "POST",
        "/api/verification/otp/verify",
        Some(user),
        Some(serde_json::json!({ "code": code })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn expired_code_is_refused() {
    let (app, db) = test_app().await;
    let user = Uuid::new_v4();
    set_role(&app, user, "entrepreneur").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/verification",
        Some(user),
        Some(serde_json::json!({ "dni": "12345678", "phone": "+51987654321" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "POST", "/api/verification/otp/send", Some(user), None).await;
    assert_eq!(status, StatusCode::OK);

    let code = latest_code(&db, "+51987654321").await;

    // Age the code past its expiry
    PhoneOtps::update_many()
        .col_expr(
            phone_otps::Column::ExpiresAt,
            Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(
                Utc::now() - Duration::seconds(1),
            )),
        )
        .filter(phone_otps::Column::Phone.eq("+51987654321"))
        .exec(&db)
        .await
        .unwrap();

    let (status, _) = send(
        &app,
        "POST",
        "/api/verification/otp/verify",
        Some(user),
        Some(serde_json::json!({ "code": code })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn changing_phone_drops_verification() {
    let (app, db) = test_app().await;
    let user = Uuid::new_v4();
    set_role(&app, user, "entrepreneur").await;
    verify_entrepreneur(&app, &db, user, "+51987654321").await;

    let (_, json) = send(
        &app,
        "POST",
        "/api/verification",
        Some(user),
        Some(serde_json::json!({ "dni": "12345678", "phone": "+51911111111" })),
    )
    .await;
    assert_eq!(json["phone_verified"], false);

    // Re-posting the unchanged number keeps the verified flag
    verify_entrepreneur(&app, &db, user, "+51911111111").await;
    let (_, json) = send(
        &app,
        "POST",
        "/api/verification",
        Some(user),
        Some(serde_json::json!({ "dni": "12345678", "phone": "+51911111111" })),
    )
    .await;
    assert_eq!(json["phone_verified"], true);
}

#[tokio::test]
async fn unverified_entrepreneur_cannot_bid() {
    let (app, _db) = test_app().await;
    let investor = Uuid::new_v4();
    let admin = Uuid::new_v4();
    let bidder = Uuid::new_v4();
    set_role(&app, investor, "investor").await;
    set_role(&app, admin, "admin").await;
    set_role(&app, bidder, "entrepreneur").await;

    let (listing_id, _) = active_listing(&app, investor, admin).await;

    let (status, json) = send(
        &app,
        "POST",
        &format!("/api/listings/{}/offers", listing_id),
        Some(bidder),
        Some(serde_json::json!({ "commission_amount": 200 })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(json["error"].as_str().unwrap().contains("verification"));
}

#[tokio::test]
async fn bids_only_on_active_listings() {
    let (app, db) = test_app().await;
    let investor = Uuid::new_v4();
    let bidder = Uuid::new_v4();
    set_role(&app, investor, "investor").await;
    set_role(&app, bidder, "entrepreneur").await;
    verify_entrepreneur(&app, &db, bidder, "+51987654321").await;

    let (listing_id, _) = publish_listing(&app, investor).await;

    let (status, json) = send(
        &app,
        "POST",
        &format!("/api/listings/{}/offers", listing_id),
        Some(bidder),
        Some(serde_json::json!({ "commission_amount": 200 })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("auction"));
}

/// One live bid per entrepreneur per listing: re-posting replaces it
#[tokio::test]
async fn rebid_replaces_previous_offer() {
    let (app, db) = test_app().await;
    let investor = Uuid::new_v4();
    let admin = Uuid::new_v4();
    let bidder = Uuid::new_v4();
    set_role(&app, investor, "investor").await;
    set_role(&app, admin, "admin").await;
    set_role(&app, bidder, "entrepreneur").await;
    verify_entrepreneur(&app, &db, bidder, "+51987654321").await;

    let (listing_id, _) = active_listing(&app, investor, admin).await;

    for amount in [300, 250] {
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/listings/{}/offers", listing_id),
            Some(bidder),
            Some(serde_json::json!({ "commission_amount": amount, "message": "pick me" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, json) = send(
        &app,
        "GET",
        &format!("/api/listings/{}/offers", listing_id),
        Some(investor),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let offers = json["offers"].as_array().unwrap();
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0]["commission_amount"], "250");
    assert_eq!(offers[0]["entrepreneur"]["phone"], "+51987654321");
    assert_eq!(offers[0]["entrepreneur"]["dni"], "12345678");
}

/// After a selection exactly one offer is `selected`, the rest are
/// `rejected`; selecting the winner again is a no-op
#[tokio::test]
async fn selection_leaves_exactly_one_winner() {
    let (app, db) = test_app().await;
    let investor = Uuid::new_v4();
    let admin = Uuid::new_v4();
    let alice = Uuid::new_v4();
    let bruno = Uuid::new_v4();
    set_role(&app, investor, "investor").await;
    set_role(&app, admin, "admin").await;
    set_role(&app, alice, "entrepreneur").await;
    set_role(&app, bruno, "entrepreneur").await;
    verify_entrepreneur(&app, &db, alice, "+51911111111").await;
    verify_entrepreneur(&app, &db, bruno, "+51922222222").await;

    let (listing_id, _) = active_listing(&app, investor, admin).await;

    for (bidder, amount) in [(alice, 300), (bruno, 200)] {
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/listings/{}/offers", listing_id),
            Some(bidder),
            Some(serde_json::json!({ "commission_amount": amount })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    // Sorted by commission ascending: bruno's 200 first
    let (_, json) = send(
        &app,
        "GET",
        &format!("/api/listings/{}/offers", listing_id),
        Some(investor),
        None,
    )
    .await;
    let offers = json["offers"].as_array().unwrap();
    assert_eq!(offers.len(), 2);
    assert_eq!(offers[0]["commission_amount"], "200");
    let winner_id = offers[0]["id"].as_str().unwrap().to_string();

    let (status, json) = send(
        &app,
        "POST",
        &format!("/api/listings/{}/offers/{}/select", listing_id, winner_id),
        Some(investor),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "selected");

    let check_states = |json: &serde_json::Value| {
        let offers = json["offers"].as_array().unwrap();
        let selected = offers.iter().filter(|o| o["status"] == "selected").count();
        let rejected = offers.iter().filter(|o| o["status"] == "rejected").count();
        (selected, rejected)
    };

    let (_, json) = send(
        &app,
        "GET",
        &format!("/api/listings/{}/offers", listing_id),
        Some(investor),
        None,
    )
    .await;
    assert_eq!(check_states(&json), (1, 1));

    // Idempotent re-selection
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/listings/{}/offers/{}/select", listing_id, winner_id),
        Some(investor),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(
        &app,
        "GET",
        &format!("/api/listings/{}/offers", listing_id),
        Some(investor),
        None,
    )
    .await;
    assert_eq!(check_states(&json), (1, 1));
}

/// An offer id from another listing does not select anything
#[tokio::test]
async fn cross_listing_selection_is_refused() {
    let (app, db) = test_app().await;
    let investor = Uuid::new_v4();
    let admin = Uuid::new_v4();
    let bidder = Uuid::new_v4();
    set_role(&app, investor, "investor").await;
    set_role(&app, admin, "admin").await;
    set_role(&app, bidder, "entrepreneur").await;
    verify_entrepreneur(&app, &db, bidder, "+51987654321").await;

    let (listing_a, _) = active_listing(&app, investor, admin).await;
    let (listing_b, _) = active_listing(&app, investor, admin).await;

    let (status, json) = send(
        &app,
        "POST",
        &format!("/api/listings/{}/offers", listing_a),
        Some(bidder),
        Some(serde_json::json!({ "commission_amount": 200 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let offer_id = json["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/listings/{}/offers/{}/select", listing_b, offer_id),
        Some(investor),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Offers are private to the owning investor
#[tokio::test]
async fn only_the_owner_reads_offers() {
    let (app, _db) = test_app().await;
    let investor = Uuid::new_v4();
    let admin = Uuid::new_v4();
    let other = Uuid::new_v4();
    set_role(&app, investor, "investor").await;
    set_role(&app, admin, "admin").await;
    set_role(&app, other, "investor").await;

    let (listing_id, _) = active_listing(&app, investor, admin).await;

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/listings/{}/offers", listing_id),
        Some(other),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn counteroffers_respect_listing_flag() {
    let (app, _db) = test_app().await;
    let investor = Uuid::new_v4();
    let bidder = Uuid::new_v4();
    set_role(&app, investor, "investor").await;
    set_role(&app, bidder, "entrepreneur").await;

    // A listing that does not allow counteroffers
    let (status, json) = send(
        &app,
        "POST",
        "/api/listings",
        Some(investor),
        Some(serde_json::json!({
            "make": "Nissan",
            "model": "Frontier",
            "year": 2021,
            "base_amount": 30000,
            "base_term_months": 36,
            "base_installment": 1000,
            "allow_counteroffers": false,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let closed_id = json["id"].as_str().unwrap().to_string();

    let (status, json) = send(
        &app,
        "POST",
        &format!("/api/listings/{}/counteroffers", closed_id),
        Some(bidder),
        Some(serde_json::json!({ "amount": 24000, "term_months": 24, "installment": 1150 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("counteroffers"));
}

/// The owner sees every counteroffer, an entrepreneur only their own
#[tokio::test]
async fn counteroffer_visibility() {
    let (app, _db) = test_app().await;
    let investor = Uuid::new_v4();
    let alice = Uuid::new_v4();
    let bruno = Uuid::new_v4();
    set_role(&app, investor, "investor").await;
    set_role(&app, alice, "entrepreneur").await;
    set_role(&app, bruno, "entrepreneur").await;

    let (listing_id, _) = publish_listing(&app, investor).await;

    for (bidder, amount) in [(alice, 24000), (bruno, 23000)] {
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/listings/{}/counteroffers", listing_id),
            Some(bidder),
            Some(serde_json::json!({
                "amount": amount,
                "term_months": 24,
                "installment": 1150,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, json) = send(
        &app,
        "GET",
        &format!("/api/listings/{}/counteroffers", listing_id),
        Some(investor),
        None,
    )
    .await;
    assert_eq!(json["counteroffers"].as_array().unwrap().len(), 2);

    let (_, json) = send(
        &app,
        "GET",
        &format!("/api/listings/{}/counteroffers", listing_id),
        Some(alice),
        None,
    )
    .await;
    let mine = json["counteroffers"].as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["entrepreneur_user_id"], alice.to_string());
}
