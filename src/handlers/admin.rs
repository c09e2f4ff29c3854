//! Admin overview endpoint.

use std::collections::HashMap;

use axum::{Json, extract::State, http::StatusCode};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::error;
use uuid::Uuid;

use crate::AppState;
use crate::auth::{AuthUser, require_role};
use crate::entities::listings::{self, ListingStatus};
use crate::entities::prelude::{Documents, Listings, Vehicles};
use crate::entities::profiles::Role;
use crate::entities::documents;
use crate::models::ErrorResponse;
use crate::models::listing::{
    AdminListingEntry, AdminListingStats, AdminListingsResponse, ListingEntry,
};
use crate::services::document_gate;

fn db_error(e: sea_orm::DbErr) -> (StatusCode, Json<ErrorResponse>) {
    error!(error = %e, "Database error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(format!("Database error: {}", e))),
    )
}

/// Every listing with its document states, gate verdict and counters
///
/// GET /api/admin/listings
pub async fn admin_listings(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<AdminListingsResponse>, (StatusCode, Json<ErrorResponse>)> {
    require_role(&state.db, user_id, &[Role::Admin]).await?;

    let rows = Listings::find()
        .find_also_related(Vehicles)
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

    let mut entries = Vec::with_capacity(rows.len());
    let mut pending_review = 0usize;
    let mut ready = 0usize;
    let mut active = 0usize;

    for (listing, vehicle) in rows {
        let Some(vehicle) = vehicle else { continue };

        let docs = docs_by_vehicle.remove(&listing.vehicle_id).unwrap_or_default();
        let statuses = document_gate::status_map(&docs);
        let gate = document_gate::evaluate(&statuses);

        if listing.status == ListingStatus::Active {
            active += 1;
        } else if gate.is_ready() {
            ready += 1;
        }
        if !gate.is_ready() && listing.status != ListingStatus::Closed {
            pending_review += 1;
        }

        entries.push(AdminListingEntry {
            listing: ListingEntry::from_parts(listing, vehicle),
            documents: statuses,
            gate,
        });
    }

    let stats = AdminListingStats {
        total: entries.len(),
        pending_review,
        ready,
        active,
    };

    Ok(Json(AdminListingsResponse {
        listings: entries,
        stats,
    }))
}
