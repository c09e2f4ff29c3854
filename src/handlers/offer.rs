//! Offer endpoints, both bidding shapes.
//!
//! Commission offers are the auction path: one live bid per entrepreneur
//! per listing, phone-verified bidders only, winner picked atomically.
//! Counteroffers are free-form amount/term/installment proposals gated by
//! the listing's `allow_counteroffers` flag.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    sea_query::OnConflict,
};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::AppState;
use crate::auth::{AuthUser, require_role};
use crate::entities::listing_offers::{self, OfferStatus};
use crate::entities::listings::{self, ListingStatus};
use crate::entities::prelude::{
    Counteroffers, EntrepreneurVerifications, ListingOffers, Listings, Profiles,
};
use crate::entities::profiles::Role;
use crate::entities::{counteroffers, entrepreneur_verifications, profiles};
use crate::models::ErrorResponse;
use crate::models::offer::{
    CommissionOfferEntry, CommissionOfferRequest, CommissionOffersResponse, CounterofferEntry,
    CounterofferRequest, CounteroffersResponse, EntrepreneurInfo,
};
use crate::services::offer_selection::{self, SelectionError};

fn db_error(e: sea_orm::DbErr) -> (StatusCode, Json<ErrorResponse>) {
    error!(error = %e, "Database error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(format!("Database error: {}", e))),
    )
}

fn listing_not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("listing not found")),
    )
}

async fn find_listing(
    state: &AppState,
    id: Uuid,
) -> Result<listings::Model, (StatusCode, Json<ErrorResponse>)> {
    Listings::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(listing_not_found)
}

/// Place or replace a commission bid
///
/// POST /api/listings/{id}/offers
pub async fn submit_commission_offer(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CommissionOfferRequest>,
) -> Result<Json<CommissionOfferEntry>, (StatusCode, Json<ErrorResponse>)> {
    require_role(&state.db, user_id, &[Role::Entrepreneur]).await?;

    if let Err(e) = payload.validate() {
        warn!(error = %e, "Invalid offer payload");
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e))));
    }

    // DNI + verified phone are mandatory to bid
    let verification = EntrepreneurVerifications::find_by_id(user_id)
        .one(&state.db)
        .await
        .map_err(db_error)?;
    if !verification.map(|v| v.phone_verified).unwrap_or(false) {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new(
                "phone verification required before bidding",
            )),
        ));
    }

    let listing = find_listing(&state, id).await?;
    if listing.status != ListingStatus::Active {
        return Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse::new("listing is not in auction")),
        ));
    }

    let now = Utc::now();
    let message = payload
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string);

    let model = listing_offers::ActiveModel {
        id: Set(Uuid::new_v4()),
        listing_id: Set(id),
        entrepreneur_user_id: Set(user_id),
        commission_amount: Set(payload.commission_amount),
        message: Set(message),
        status: Set(OfferStatus::Pending),
        created_at: Set(Some(now.into())),
        updated_at: Set(Some(now.into())),
    };

    ListingOffers::insert(model)
        .on_conflict(
            OnConflict::columns([
                listing_offers::Column::ListingId,
                listing_offers::Column::EntrepreneurUserId,
            ])
            .update_columns([
                listing_offers::Column::CommissionAmount,
                listing_offers::Column::Message,
                listing_offers::Column::Status,
                listing_offers::Column::UpdatedAt,
            ])
            .to_owned(),
        )
        .exec(&state.db)
        .await
        .map_err(db_error)?;

    let offer = ListingOffers::find()
        .filter(listing_offers::Column::ListingId.eq(id))
        .filter(listing_offers::Column::EntrepreneurUserId.eq(user_id))
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("offer missing after upsert")),
            )
        })?;

    info!(listing_id = %id, entrepreneur = %user_id, "commission offer placed");
    Ok(Json(CommissionOfferEntry::from_model(offer, None)))
}

/// Offers received, cheapest commission first
///
/// GET /api/listings/{id}/offers
///
/// Owning investor only; each bid carries the entrepreneur's contact
/// block so the owner can follow up.
pub async fn list_commission_offers(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CommissionOffersResponse>, (StatusCode, Json<ErrorResponse>)> {
    require_role(&state.db, user_id, &[Role::Investor]).await?;

    let listing = find_listing(&state, id).await?;
    if listing.investor_user_id != user_id {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("not the owner of this listing")),
        ));
    }

    let offers = ListingOffers::find()
        .filter(listing_offers::Column::ListingId.eq(id))
        .order_by_asc(listing_offers::Column::CommissionAmount)
        .all(&state.db)
        .await
        .map_err(db_error)?;

    let bidder_ids: Vec<Uuid> = offers.iter().map(|o| o.entrepreneur_user_id).collect();

    let mut names: HashMap<Uuid, Option<String>> = HashMap::new();
    let mut contacts: HashMap<Uuid, (String, String)> = HashMap::new();
    if !bidder_ids.is_empty() {
        for profile in Profiles::find()
            .filter(profiles::Column::Id.is_in(bidder_ids.clone()))
            .all(&state.db)
            .await
            .map_err(db_error)?
        {
            names.insert(profile.id, profile.full_name);
        }
        for verification in EntrepreneurVerifications::find()
            .filter(entrepreneur_verifications::Column::UserId.is_in(bidder_ids))
            .all(&state.db)
            .await
            .map_err(db_error)?
        {
            contacts.insert(
                verification.user_id,
                (verification.phone, verification.dni),
            );
        }
    }

    let offers = offers
        .into_iter()
        .map(|offer| {
            let bidder = offer.entrepreneur_user_id;
            let (phone, dni) = contacts
                .get(&bidder)
                .cloned()
                .map(|(p, d)| (Some(p), Some(d)))
                .unwrap_or((None, None));
            let entrepreneur = EntrepreneurInfo {
                full_name: names.get(&bidder).cloned().flatten(),
                phone,
                dni,
            };
            CommissionOfferEntry::from_model(offer, Some(entrepreneur))
        })
        .collect();

    Ok(Json(CommissionOffersResponse { offers }))
}

/// Pick the winning bid
///
/// POST /api/listings/{id}/offers/{offer_id}/select
pub async fn select_commission_offer(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((id, offer_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<CommissionOfferEntry>, (StatusCode, Json<ErrorResponse>)> {
    require_role(&state.db, user_id, &[Role::Investor]).await?;

    let listing = find_listing(&state, id).await?;
    if listing.investor_user_id != user_id {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("not the owner of this listing")),
        ));
    }

    let winner = offer_selection::select_winner(&state.db, id, offer_id)
        .await
        .map_err(|e| match e {
            SelectionError::OfferNotFound => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("offer not found for this listing")),
            ),
            SelectionError::Db(e) => db_error(e),
        })?;

    Ok(Json(CommissionOfferEntry::from_model(winner, None)))
}

/// Place a counteroffer
///
/// POST /api/listings/{id}/counteroffers
pub async fn submit_counteroffer(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CounterofferRequest>,
) -> Result<Json<CounterofferEntry>, (StatusCode, Json<ErrorResponse>)> {
    require_role(&state.db, user_id, &[Role::Entrepreneur]).await?;

    if let Err(e) = payload.validate() {
        warn!(error = %e, "Invalid counteroffer payload");
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e))));
    }

    let listing = find_listing(&state, id).await?;
    if !listing.allow_counteroffers {
        return Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse::new(
                "this listing does not accept counteroffers",
            )),
        ));
    }

    let counteroffer = counteroffers::ActiveModel {
        id: Set(Uuid::new_v4()),
        listing_id: Set(id),
        entrepreneur_user_id: Set(user_id),
        amount: Set(payload.amount),
        term_months: Set(payload.term_months),
        installment: Set(payload.installment),
        status: Set(OfferStatus::Pending),
        created_at: Set(Some(Utc::now().into())),
    }
    .insert(&state.db)
    .await
    .map_err(db_error)?;

    info!(listing_id = %id, entrepreneur = %user_id, "counteroffer placed");
    Ok(Json(counteroffer.into()))
}

/// Counteroffers for a listing, newest first
///
/// GET /api/listings/{id}/counteroffers
///
/// The owner sees every bid; an entrepreneur sees only their own.
pub async fn list_counteroffers(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CounteroffersResponse>, (StatusCode, Json<ErrorResponse>)> {
    let listing = find_listing(&state, id).await?;

    let mut select = Counteroffers::find()
        .filter(counteroffers::Column::ListingId.eq(id))
        .order_by_desc(counteroffers::Column::CreatedAt);

    if listing.investor_user_id != user_id {
        select = select.filter(counteroffers::Column::EntrepreneurUserId.eq(user_id));
    }

    let counteroffers = select
        .all(&state.db)
        .await
        .map_err(db_error)?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(CounteroffersResponse { counteroffers }))
}
