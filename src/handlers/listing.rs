//! Listing endpoints.
//!
//! Publishing creates the vehicle and its listing in one transaction, so
//! there is no half-published state to clean up. Status changes all go
//! through the lifecycle service and its transition table.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::AppState;
use crate::auth::{AuthUser, require_role};
use crate::entities::listings::{self, ListingStatus};
use crate::entities::prelude::{Counteroffers, Documents, ListingOffers, Listings, Profiles, Vehicles};
use crate::entities::profiles::Role;
use crate::entities::{counteroffers, documents, listing_offers, vehicles};
use crate::models::listing::{
    CreateListingRequest, ListingDetailResponse, ListingEntry, ListingListResponse,
    ListingQuery, ListingSummary, OwnedListingEntry, OwnedListingsResponse,
    UpdateListingStatusRequest,
};
use crate::models::{ErrorResponse, MessageResponse};
use crate::services::document_gate;
use crate::services::lifecycle::{self, LifecycleError};

fn db_error(e: sea_orm::DbErr) -> (StatusCode, Json<ErrorResponse>) {
    error!(error = %e, "Database error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(format!("Database error: {}", e))),
    )
}

/// Publish a vehicle with its financing terms
///
/// POST /api/listings
pub async fn create_listing(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateListingRequest>,
) -> Result<Json<ListingEntry>, (StatusCode, Json<ErrorResponse>)> {
    require_role(&state.db, user_id, &[Role::Investor]).await?;

    if let Err(e) = payload.validate() {
        warn!(error = %e, "Invalid listing payload");
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e))));
    }

    let now = Utc::now();
    let txn = state.db.begin().await.map_err(db_error)?;

    let vehicle = vehicles::ActiveModel {
        id: Set(Uuid::new_v4()),
        owner_user_id: Set(user_id),
        plate: Set(payload
            .plate
            .as_deref()
            .map(|p| p.trim().to_uppercase())
            .filter(|p| !p.is_empty())),
        make: Set(payload.make.trim().to_string()),
        model: Set(payload.model.trim().to_string()),
        year: Set(payload.year),
        created_at: Set(Some(now.into())),
    }
    .insert(&txn)
    .await
    .map_err(db_error)?;

    let listing = listings::ActiveModel {
        id: Set(Uuid::new_v4()),
        vehicle_id: Set(vehicle.id),
        investor_user_id: Set(user_id),
        base_amount: Set(payload.base_amount),
        base_term_months: Set(payload.base_term_months),
        base_installment: Set(payload.base_installment),
        allow_counteroffers: Set(payload.allow_counteroffers.unwrap_or(true)),
        status: Set(ListingStatus::PendingDocs),
        auction_starts_at: Set(None),
        auction_ends_at: Set(None),
        created_at: Set(Some(now.into())),
        updated_at: Set(Some(now.into())),
    }
    .insert(&txn)
    .await
    .map_err(db_error)?;

    txn.commit().await.map_err(db_error)?;

    info!(listing_id = %listing.id, vehicle_id = %vehicle.id, "listing published");
    Ok(Json(ListingEntry::from_parts(listing, vehicle)))
}

/// Marketplace: active listings with their vehicles
///
/// GET /api/listings
pub async fn list_listings(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<ListingListResponse>, (StatusCode, Json<ErrorResponse>)> {
    if let Err(e) = query.validate() {
        warn!(error = %e, "Invalid listing query");
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e))));
    }

    let limit = query.limit.unwrap_or(20).min(100);
    let offset = query.offset.unwrap_or(0);

    let mut select = Listings::find()
        .find_also_related(Vehicles)
        .filter(listings::Column::Status.eq(ListingStatus::Active));

    if let Some(make) = query.make.as_deref().map(str::trim) {
        if !make.is_empty() {
            select = select.filter(vehicles::Column::Make.contains(make));
        }
    }

    let total = select.clone().count(&state.db).await.map_err(db_error)?;

    let rows = select
        .order_by_desc(listings::Column::CreatedAt)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.db)
        .await
        .map_err(db_error)?;

    let listings = rows
        .into_iter()
        .filter_map(|(listing, vehicle)| {
            vehicle.map(|v| ListingEntry::from_parts(listing, v))
        })
        .collect();

    Ok(Json(ListingListResponse {
        listings,
        total,
        limit,
        offset,
    }))
}

/// The caller's own listings with document status and gate verdict
///
/// GET /api/listings/mine
pub async fn my_listings(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<OwnedListingsResponse>, (StatusCode, Json<ErrorResponse>)> {
    require_role(&state.db, user_id, &[Role::Investor]).await?;

    let rows = Listings::find()
        .find_also_related(Vehicles)
        .filter(listings::Column::InvestorUserId.eq(user_id))
        .order_by_desc(listings::Column::CreatedAt)
        .all(&state.db)
        .await
        .map_err(db_error)?;

    let vehicle_ids: Vec<Uuid> = rows.iter().map(|(l, _)| l.vehicle_id).collect();

    let mut docs_by_vehicle: HashMap<Uuid, Vec<documents::Model>> = HashMap::new();
    if !vehicle_ids.is_empty() {
        let docs = Documents::find()
            .filter(documents::Column::VehicleId.is_in(vehicle_ids))
            .all(&state.db)
            .await
            .map_err(db_error)?;
        for doc in docs {
            docs_by_vehicle.entry(doc.vehicle_id).or_default().push(doc);
        }
    }

    let listings = rows
        .into_iter()
        .filter_map(|(listing, vehicle)| {
            let vehicle = vehicle?;
            let docs = docs_by_vehicle.remove(&listing.vehicle_id).unwrap_or_default();
            let statuses = document_gate::status_map(&docs);
            let gate = document_gate::evaluate(&statuses);
            Some(OwnedListingEntry {
                listing: ListingEntry::from_parts(listing, vehicle),
                documents: statuses,
                gate,
            })
        })
        .collect();

    Ok(Json(OwnedListingsResponse { listings }))
}

/// Listing detail with vehicle and counteroffers
///
/// GET /api/listings/{id}
pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ListingDetailResponse>, (StatusCode, Json<ErrorResponse>)> {
    let row = Listings::find_by_id(id)
        .find_also_related(Vehicles)
        .one(&state.db)
        .await
        .map_err(db_error)?;

    let Some((listing, Some(vehicle))) = row else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("listing not found")),
        ));
    };

    let counteroffers = Counteroffers::find()
        .filter(counteroffers::Column::ListingId.eq(id))
        .order_by_desc(counteroffers::Column::CreatedAt)
        .all(&state.db)
        .await
        .map_err(db_error)?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(ListingDetailResponse {
        listing: ListingEntry::from_parts(listing, vehicle),
        counteroffers,
    }))
}

/// Pause, activate or close a listing
///
/// PUT /api/listings/{id}/status
///
/// Owner or admin. Activation re-checks the document gate and refuses
/// with the verdict when it does not pass.
pub async fn update_listing_status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateListingStatusRequest>,
) -> Result<Json<ListingSummary>, (StatusCode, Json<ErrorResponse>)> {
    let listing = Listings::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("listing not found")),
            )
        })?;

    let profile = Profiles::find_by_id(user_id)
        .one(&state.db)
        .await
        .map_err(db_error)?;
    let is_admin = profile.as_ref().and_then(|p| p.role) == Some(Role::Admin);

    if !is_admin && listing.investor_user_id != user_id {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("not the owner of this listing")),
        ));
    }

    let updated = lifecycle::set_status(&state.db, listing, payload.status)
        .await
        .map_err(|e| match e {
            LifecycleError::InvalidTransition { .. } => {
                warn!(listing_id = %id, error = %e, "Refused status change");
                (StatusCode::CONFLICT, Json(ErrorResponse::new(e.to_string())))
            }
            LifecycleError::GateNotPassed(outcome) => {
                warn!(listing_id = %id, gate = outcome.label(), "Refused activation");
                (
                    StatusCode::CONFLICT,
                    Json(ErrorResponse::new(format!(
                        "cannot activate, documents {}",
                        outcome.label()
                    ))),
                )
            }
            LifecycleError::Db(e) => db_error(e),
        })?;

    Ok(Json(updated.into()))
}

/// Delete a listing together with its vehicle, documents and offers
///
/// DELETE /api/listings/{id}
pub async fn delete_listing(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ErrorResponse>)> {
    require_role(&state.db, user_id, &[Role::Investor]).await?;

    let listing = Listings::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("listing not found")),
            )
        })?;

    if listing.investor_user_id != user_id {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("not the owner of this listing")),
        ));
    }

    let txn = state.db.begin().await.map_err(db_error)?;

    ListingOffers::delete_many()
        .filter(listing_offers::Column::ListingId.eq(id))
        .exec(&txn)
        .await
        .map_err(db_error)?;
    Counteroffers::delete_many()
        .filter(counteroffers::Column::ListingId.eq(id))
        .exec(&txn)
        .await
        .map_err(db_error)?;
    Documents::delete_many()
        .filter(documents::Column::VehicleId.eq(listing.vehicle_id))
        .exec(&txn)
        .await
        .map_err(db_error)?;
    Listings::delete_by_id(id).exec(&txn).await.map_err(db_error)?;
    Vehicles::delete_by_id(listing.vehicle_id)
        .exec(&txn)
        .await
        .map_err(db_error)?;

    txn.commit().await.map_err(db_error)?;

    info!(listing_id = %id, vehicle_id = %listing.vehicle_id, "listing deleted");
    Ok(Json(MessageResponse::new("listing deleted")))
}
