//! Document endpoints.
//!
//! Owners register uploaded files per document type (upsert, back into
//! review), admins work the queue and decide. A decision and the
//! activation it may trigger commit together or not at all.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, sea_query::OnConflict};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::AppState;
use crate::auth::{AuthUser, require_role};
use crate::entities::documents::{self, DocumentStatus};
use crate::entities::prelude::{Documents, Vehicles};
use crate::entities::profiles::Role;
use crate::models::ErrorResponse;
use crate::models::document::{
    DocumentListResponse, DocumentQuery, DocumentResponse, ReviewDocumentRequest,
    ReviewDocumentResponse, SubmitDocumentRequest,
};
use crate::services::document_review::{self, ReviewError};

fn db_error(e: sea_orm::DbErr) -> (StatusCode, Json<ErrorResponse>) {
    error!(error = %e, "Database error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(format!("Database error: {}", e))),
    )
}

/// Register an uploaded document for a vehicle
///
/// PUT /api/vehicles/{vehicle_id}/documents
///
/// Upsert on (vehicle, doc type): re-submitting replaces the file
/// reference and puts the document back in review.
pub async fn submit_document(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(vehicle_id): Path<Uuid>,
    Json(payload): Json<SubmitDocumentRequest>,
) -> Result<Json<DocumentResponse>, (StatusCode, Json<ErrorResponse>)> {
    require_role(&state.db, user_id, &[Role::Investor]).await?;

    if let Err(e) = payload.validate() {
        warn!(error = %e, "Invalid document payload");
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e))));
    }

    let vehicle = Vehicles::find_by_id(vehicle_id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("vehicle not found")),
            )
        })?;

    if vehicle.owner_user_id != user_id {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("not the owner of this vehicle")),
        ));
    }

    let now = Utc::now();
    let model = documents::ActiveModel {
        id: Set(Uuid::new_v4()),
        vehicle_id: Set(vehicle_id),
        owner_user_id: Set(user_id),
        doc_type: Set(payload.doc_type),
        file_path: Set(payload.file_path.trim().to_string()),
        status: Set(DocumentStatus::Pending),
        admin_notes: Set(None),
        reviewed_by: Set(None),
        reviewed_at: Set(None),
        created_at: Set(Some(now.into())),
    };

    Documents::insert(model)
        .on_conflict(
            OnConflict::columns([documents::Column::VehicleId, documents::Column::DocType])
                .update_columns([
                    documents::Column::FilePath,
                    documents::Column::Status,
                    documents::Column::AdminNotes,
                    documents::Column::ReviewedBy,
                    documents::Column::ReviewedAt,
                ])
                .to_owned(),
        )
        .exec(&state.db)
        .await
        .map_err(db_error)?;

    let document = Documents::find()
        .filter(documents::Column::VehicleId.eq(vehicle_id))
        .filter(documents::Column::DocType.eq(payload.doc_type))
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("document missing after upsert")),
            )
        })?;

    info!(
        vehicle_id = %vehicle_id,
        doc_type = ?payload.doc_type,
        "document submitted for review"
    );
    Ok(Json(document.into()))
}

/// Admin review queue
///
/// GET /api/documents
///
/// Defaults to pending documents; `all=true` or an explicit `status`
/// widens the view. `vehicle_id` narrows to one vehicle.
pub async fn list_documents(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<DocumentQuery>,
) -> Result<Json<DocumentListResponse>, (StatusCode, Json<ErrorResponse>)> {
    require_role(&state.db, user_id, &[Role::Admin]).await?;

    let mut select = Documents::find().order_by_desc(documents::Column::CreatedAt);

    if let Some(vehicle_id) = query.vehicle_id {
        select = select.filter(documents::Column::VehicleId.eq(vehicle_id));
    }

    match (query.all.unwrap_or(false), query.status) {
        (false, Some(status)) => {
            select = select.filter(documents::Column::Status.eq(status));
        }
        (false, None) => {
            select = select.filter(documents::Column::Status.eq(DocumentStatus::Pending));
        }
        (true, _) => {}
    }

    let documents = select
        .all(&state.db)
        .await
        .map_err(db_error)?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(DocumentListResponse { documents }))
}

/// Decide on a pending document
///
/// PUT /api/documents/{id}/review
///
/// Approving the second gating document activates the auction in the
/// same transaction; the response says whether that happened.
pub async fn review_document(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewDocumentRequest>,
) -> Result<Json<ReviewDocumentResponse>, (StatusCode, Json<ErrorResponse>)> {
    require_role(&state.db, user_id, &[Role::Admin]).await?;

    if let Err(e) = payload.validate() {
        warn!(error = %e, "Invalid review payload");
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e))));
    }

    let note = payload
        .note
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    let result =
        document_review::review_document(&state.db, id, payload.decision.into(), note, user_id)
            .await
            .map_err(|e| match e {
                ReviewError::DocumentNotFound => (
                    StatusCode::NOT_FOUND,
                    Json(ErrorResponse::new("document not found")),
                ),
                ReviewError::AlreadyReviewed(_) => {
                    warn!(document_id = %id, error = %e, "Refused re-review");
                    (StatusCode::CONFLICT, Json(ErrorResponse::new(e.to_string())))
                }
                ReviewError::Db(e) => db_error(e),
            })?;

    Ok(Json(ReviewDocumentResponse {
        document: result.document.into(),
        gate: result.gate,
        activated: result.activated.is_some(),
        listing: result.activated.map(Into::into),
    }))
}
