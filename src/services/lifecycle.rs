//! Listing lifecycle.
//!
//! Every status change goes through this module: the transition table,
//! the 7-day auction window stamping, and the auto-activation that runs
//! in the same transaction as an admin's document approval. Activation is
//! refused whenever the document gate does not pass, no matter which path
//! asked for it.

use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::listings::{self, ListingStatus};
use crate::entities::prelude::Listings;
use crate::services::document_gate::{self, GateOutcome};

/// Length of the auction window stamped on activation, in days
pub const AUCTION_WINDOW_DAYS: i64 = 7;

#[derive(Debug)]
pub enum LifecycleError {
    InvalidTransition {
        from: ListingStatus,
        to: ListingStatus,
    },
    GateNotPassed(GateOutcome),
    Db(sea_orm::DbErr),
}

impl std::fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleError::InvalidTransition { from, to } => {
                write!(f, "invalid transition {:?} -> {:?}", from, to)
            }
            LifecycleError::GateNotPassed(outcome) => {
                write!(f, "document gate not passed: {}", outcome.label())
            }
            LifecycleError::Db(e) => write!(f, "database error: {}", e),
        }
    }
}

impl std::error::Error for LifecycleError {}

impl From<sea_orm::DbErr> for LifecycleError {
    fn from(e: sea_orm::DbErr) -> Self {
        LifecycleError::Db(e)
    }
}

/// The transition table. `closed` is terminal.
pub fn transition_allowed(from: ListingStatus, to: ListingStatus) -> bool {
    use ListingStatus::*;
    matches!(
        (from, to),
        (PendingDocs, Active)
            | (Paused, Active)
            | (Active, Paused)
            | (Active, Closed)
            | (Paused, Closed)
            | (PendingDocs, Closed)
    )
}

/// Auction window for an activation at `now`
pub fn auction_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (now, now + Duration::days(AUCTION_WINDOW_DAYS))
}

/// Apply a requested status change, re-checking the document gate on any
/// transition into `active`. Activation restamps the auction window.
pub async fn set_status<C: ConnectionTrait>(
    conn: &C,
    listing: listings::Model,
    to: ListingStatus,
) -> Result<listings::Model, LifecycleError> {
    let from = listing.status;

    if !transition_allowed(from, to) {
        return Err(LifecycleError::InvalidTransition { from, to });
    }

    if to == ListingStatus::Active {
        let outcome = document_gate::evaluate_for_vehicle(conn, listing.vehicle_id).await?;
        if !outcome.is_ready() {
            return Err(LifecycleError::GateNotPassed(outcome));
        }
    }

    let listing_id = listing.id;
    let mut active: listings::ActiveModel = listing.into_active_model();
    active.status = Set(to);
    if to == ListingStatus::Active {
        let (starts, ends) = auction_window(Utc::now());
        active.auction_starts_at = Set(Some(starts.into()));
        active.auction_ends_at = Set(Some(ends.into()));
    }
    active.updated_at = Set(Some(Utc::now().into()));

    let updated = active.update(conn).await?;
    info!(listing_id = %listing_id, from = ?from, to = ?to, "listing status changed");
    Ok(updated)
}

/// Activate the vehicle's listing if the gate now passes.
///
/// Called inside the transaction that wrote a document status, so a
/// failed activation rolls the approval back with it. Listings already
/// active or closed are left alone. Returns the updated listing when an
/// activation happened.
pub async fn try_auto_activate<C: ConnectionTrait>(
    conn: &C,
    vehicle_id: Uuid,
) -> Result<Option<listings::Model>, sea_orm::DbErr> {
    let Some(listing) = Listings::find()
        .filter(listings::Column::VehicleId.eq(vehicle_id))
        .one(conn)
        .await?
    else {
        return Ok(None);
    };

    if matches!(
        listing.status,
        ListingStatus::Active | ListingStatus::Closed
    ) {
        return Ok(None);
    }

    let outcome = document_gate::evaluate_for_vehicle(conn, vehicle_id).await?;
    if !outcome.is_ready() {
        return Ok(None);
    }

    let listing_id = listing.id;
    let (starts, ends) = auction_window(Utc::now());
    let mut active: listings::ActiveModel = listing.into_active_model();
    active.status = Set(ListingStatus::Active);
    active.auction_starts_at = Set(Some(starts.into()));
    active.auction_ends_at = Set(Some(ends.into()));
    active.updated_at = Set(Some(Utc::now().into()));

    let updated = active.update(conn).await?;
    info!(listing_id = %listing_id, vehicle_id = %vehicle_id, "auction auto-activated");
    Ok(Some(updated))
}
