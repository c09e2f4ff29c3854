// src/lib.rs

use axum::{
    Router,
    routing::{get, post, put},
};
use sea_orm::DatabaseConnection;
use services::{otp::OtpService, sms::SmsService};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub sms: SmsService,
    pub otp: OtpService,
}

pub mod entities {
    pub mod prelude;

    pub mod counteroffers;
    pub mod documents;
    pub mod entrepreneur_verifications;
    pub mod listing_offers;
    pub mod listings;
    pub mod phone_otps;
    pub mod profiles;
    pub mod vehicles;
}

pub mod services {
    pub mod document_gate;
    pub mod document_review;
    pub mod lifecycle;
    pub mod offer_selection;
    pub mod otp;
    pub mod sms;
}

pub mod auth;
pub mod handlers;
pub mod models;

/// Build the full application router over the given state.
///
/// Shared by the binary and the integration tests so both drive exactly
/// the same routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/profile", get(handlers::profile::get_profile))
        .route("/api/profile/role", put(handlers::profile::set_role))
        .route(
            "/api/listings",
            post(handlers::listing::create_listing).get(handlers::listing::list_listings),
        )
        .route("/api/listings/mine", get(handlers::listing::my_listings))
        .route(
            "/api/listings/{id}",
            get(handlers::listing::get_listing).delete(handlers::listing::delete_listing),
        )
        .route(
            "/api/listings/{id}/status",
            put(handlers::listing::update_listing_status),
        )
        .route(
            "/api/listings/{id}/offers",
            post(handlers::offer::submit_commission_offer)
                .get(handlers::offer::list_commission_offers),
        )
        .route(
            "/api/listings/{id}/offers/{offer_id}/select",
            post(handlers::offer::select_commission_offer),
        )
        .route(
            "/api/listings/{id}/counteroffers",
            post(handlers::offer::submit_counteroffer).get(handlers::offer::list_counteroffers),
        )
        .route(
            "/api/vehicles/{vehicle_id}/documents",
            put(handlers::document::submit_document),
        )
        .route("/api/documents", get(handlers::document::list_documents))
        .route(
            "/api/documents/{id}/review",
            put(handlers::document::review_document),
        )
        .route(
            "/api/verification",
            get(handlers::verification::get_verification)
                .post(handlers::verification::upsert_verification),
        )
        .route(
            "/api/verification/otp/send",
            post(handlers::verification::send_otp),
        )
        .route(
            "/api/verification/otp/verify",
            post(handlers::verification::verify_otp),
        )
        .route("/api/admin/listings", get(handlers::admin::admin_listings))
        .with_state(state)
}

async fn root() -> &'static str {
    "FleetBid backend"
}
