//! Identity and role gate.
//!
//! Authentication itself is the fronting gateway's job; it injects the
//! verified identity as an `x-user-id` header. This module extracts that
//! identity and enforces the role checks the rest of the API hangs off:
//! the role alone decides which write operations an identity may perform.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use sea_orm::{DatabaseConnection, EntityTrait};
use tracing::error;
use uuid::Uuid;

use crate::entities::prelude::Profiles;
use crate::entities::profiles::{self, Role};
use crate::models::ErrorResponse;

pub const USER_ID_HEADER: &str = "x-user-id";

pub type AuthRejection = (StatusCode, Json<ErrorResponse>);

/// Verified caller identity, injected by the gateway
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| unauthorized("missing identity header"))?;

        let user_id =
            Uuid::parse_str(value).map_err(|_| unauthorized("invalid identity header"))?;

        Ok(AuthUser(user_id))
    }
}

fn unauthorized(msg: &str) -> AuthRejection {
    (StatusCode::UNAUTHORIZED, Json(ErrorResponse::new(msg)))
}

/// Load the caller's profile and require one of the given roles.
///
/// Callers with no profile or no role yet get a 403 pointing at role
/// selection, mirroring the client-side redirect the dashboards use.
pub async fn require_role(
    db: &DatabaseConnection,
    user_id: Uuid,
    allowed: &[Role],
) -> Result<profiles::Model, AuthRejection> {
    let profile = Profiles::find_by_id(user_id).one(db).await.map_err(|e| {
        error!(error = %e, user_id = %user_id, "failed to load profile");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(format!("Database error: {}", e))),
        )
    })?;

    let Some(profile) = profile else {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("no profile for this identity")),
        ));
    };

    match profile.role {
        Some(role) if allowed.contains(&role) => Ok(profile),
        Some(_) => Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("role not allowed for this operation")),
        )),
        None => Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("role not set, pick a role first")),
        )),
    }
}
