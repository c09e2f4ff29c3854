//! Profile and role endpoints.
//!
//! GET /api/profile and PUT /api/profile/role. The role write is an
//! upsert keyed on the identity: switching role updates the one row and
//! never creates a second profile.

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use sea_orm::{EntityTrait, Set, sea_query::OnConflict};
use tracing::{error, info, warn};

use crate::AppState;
use crate::auth::AuthUser;
use crate::entities::prelude::Profiles;
use crate::entities::profiles;
use crate::models::ErrorResponse;
use crate::models::profile::{ProfileResponse, SetRoleRequest};

/// Get the caller's profile
///
/// GET /api/profile
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, (StatusCode, Json<ErrorResponse>)> {
    let profile = Profiles::find_by_id(user_id)
        .one(&state.db)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to query profile");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(format!("Database error: {}", e))),
            )
        })?;

    match profile {
        Some(profile) => Ok(Json(profile.into())),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("no profile for this identity")),
        )),
    }
}

/// Set or switch the caller's role
///
/// PUT /api/profile/role
pub async fn set_role(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SetRoleRequest>,
) -> Result<Json<ProfileResponse>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(e) = payload.validate() {
        warn!(error = %e, "Invalid role payload");
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e))));
    }

    let now = Utc::now();

    let mut conflict = OnConflict::column(profiles::Column::Id);
    conflict.update_columns([profiles::Column::Role, profiles::Column::UpdatedAt]);
    if payload.full_name.is_some() {
        conflict.update_column(profiles::Column::FullName);
    }

    let model = profiles::ActiveModel {
        id: Set(user_id),
        role: Set(Some(payload.role)),
        full_name: Set(payload.full_name.clone()),
        created_at: Set(Some(now.into())),
        updated_at: Set(Some(now.into())),
    };

    Profiles::insert(model)
        .on_conflict(conflict)
        .exec(&state.db)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to upsert role");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(format!("Database error: {}", e))),
            )
        })?;

    let profile = Profiles::find_by_id(user_id)
        .one(&state.db)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to reload profile");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(format!("Database error: {}", e))),
            )
        })?
        .ok_or_else(|| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("profile missing after upsert")),
            )
        })?;

    info!(user_id = %user_id, role = ?payload.role, "role set");
    Ok(Json(profile.into()))
}
