//! Entrepreneur verification endpoints.
//!
//! DNI + phone upsert, then SMS code round trip. A verified phone is the
//! bidding prerequisite checked by the offer endpoints.

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, Set, sea_query::OnConflict};
use tracing::{error, info, warn};

use crate::AppState;
use crate::auth::{AuthUser, require_role};
use crate::entities::entrepreneur_verifications::{self, VerificationStatus};
use crate::entities::prelude::EntrepreneurVerifications;
use crate::entities::profiles::Role;
use crate::models::verification::{OtpVerifyRequest, VerificationRequest, VerificationResponse};
use crate::models::{ErrorResponse, MessageResponse};

fn db_error(e: sea_orm::DbErr) -> (StatusCode, Json<ErrorResponse>) {
    error!(error = %e, "Database error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(format!("Database error: {}", e))),
    )
}

fn not_registered() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("no verification data, register DNI and phone first")),
    )
}

/// The caller's verification row
///
/// GET /api/verification
pub async fn get_verification(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<VerificationResponse>, (StatusCode, Json<ErrorResponse>)> {
    require_role(&state.db, user_id, &[Role::Entrepreneur]).await?;

    let verification = EntrepreneurVerifications::find_by_id(user_id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(not_registered)?;

    Ok(Json(verification.into()))
}

/// Register or update DNI and phone
///
/// POST /api/verification
///
/// Changing the phone drops `phone_verified`; re-posting the same number
/// keeps it.
pub async fn upsert_verification(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<VerificationRequest>,
) -> Result<Json<VerificationResponse>, (StatusCode, Json<ErrorResponse>)> {
    require_role(&state.db, user_id, &[Role::Entrepreneur]).await?;

    if let Err(e) = payload.validate() {
        warn!(error = %e, "Invalid verification payload");
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e))));
    }

    let dni = payload.dni.trim().to_string();
    let phone = payload.phone.trim().to_string();

    let existing = EntrepreneurVerifications::find_by_id(user_id)
        .one(&state.db)
        .await
        .map_err(db_error)?;
    let keep_verified = existing
        .map(|v| v.phone == phone && v.phone_verified)
        .unwrap_or(false);

    let now = Utc::now();
    let model = entrepreneur_verifications::ActiveModel {
        user_id: Set(user_id),
        dni: Set(dni),
        phone: Set(phone),
        phone_verified: Set(keep_verified),
        status: Set(VerificationStatus::Pending),
        created_at: Set(Some(now.into())),
        updated_at: Set(Some(now.into())),
    };

    EntrepreneurVerifications::insert(model)
        .on_conflict(
            OnConflict::column(entrepreneur_verifications::Column::UserId)
                .update_columns([
                    entrepreneur_verifications::Column::Dni,
                    entrepreneur_verifications::Column::Phone,
                    entrepreneur_verifications::Column::PhoneVerified,
                    entrepreneur_verifications::Column::Status,
                    entrepreneur_verifications::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec(&state.db)
        .await
        .map_err(db_error)?;

    let verification = EntrepreneurVerifications::find_by_id(user_id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("verification missing after upsert")),
            )
        })?;

    info!(user_id = %user_id, "verification data saved");
    Ok(Json(verification.into()))
}

/// Send a verification code to the registered phone
///
/// POST /api/verification/otp/send
pub async fn send_otp(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ErrorResponse>)> {
    require_role(&state.db, user_id, &[Role::Entrepreneur]).await?;

    let verification = EntrepreneurVerifications::find_by_id(user_id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(not_registered)?;

    if verification.phone_verified {
        return Ok(Json(MessageResponse::new("phone already verified")));
    }

    let code = state
        .otp
        .issue(&state.db, &verification.phone)
        .await
        .map_err(db_error)?;

    state
        .sms
        .send_code(&verification.phone, &code)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to deliver verification SMS");
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse::new(e.to_string())),
            )
        })?;

    Ok(Json(MessageResponse::new("verification code sent")))
}

/// Confirm the code received over SMS
///
/// POST /api/verification/otp/verify
pub async fn verify_otp(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<OtpVerifyRequest>,
) -> Result<Json<VerificationResponse>, (StatusCode, Json<ErrorResponse>)> {
    require_role(&state.db, user_id, &[Role::Entrepreneur]).await?;

    if let Err(e) = payload.validate() {
        warn!(error = %e, "Invalid OTP payload");
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e))));
    }

    let verification = EntrepreneurVerifications::find_by_id(user_id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(not_registered)?;

    let valid = state
        .otp
        .verify(&state.db, &verification.phone, payload.code.trim())
        .await
        .map_err(db_error)?;

    if !valid {
        warn!(user_id = %user_id, "OTP rejected");
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("invalid or expired code")),
        ));
    }

    let mut verified = verification.into_active_model();
    verified.phone_verified = Set(true);
    verified.updated_at = Set(Some(Utc::now().into()));
    let verification = verified.update(&state.db).await.map_err(db_error)?;

    info!(user_id = %user_id, "phone verified");
    Ok(Json(verification.into()))
}
