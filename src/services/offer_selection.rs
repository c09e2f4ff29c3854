//! Winner selection over commission offers.
//!
//! Reject-all-then-select runs as one transaction keyed on the listing,
//! so two concurrent selections cannot leave zero or two winners. The
//! invariant afterwards: exactly one `selected` offer per listing, all
//! others `rejected`.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, Set, TransactionTrait, sea_query::Expr,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::listing_offers::{self, OfferStatus};
use crate::entities::prelude::ListingOffers;

#[derive(Debug)]
pub enum SelectionError {
    /// No such offer under this listing
    OfferNotFound,
    Db(sea_orm::DbErr),
}

impl std::fmt::Display for SelectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionError::OfferNotFound => write!(f, "offer not found for this listing"),
            SelectionError::Db(e) => write!(f, "database error: {}", e),
        }
    }
}

impl std::error::Error for SelectionError {}

impl From<sea_orm::DbErr> for SelectionError {
    fn from(e: sea_orm::DbErr) -> Self {
        SelectionError::Db(e)
    }
}

/// Mark one offer selected and every other offer of the listing rejected.
///
/// Selecting the current winner again is a no-op success.
pub async fn select_winner(
    db: &DatabaseConnection,
    listing_id: Uuid,
    offer_id: Uuid,
) -> Result<listing_offers::Model, SelectionError> {
    let txn = db.begin().await?;

    let Some(offer) = ListingOffers::find_by_id(offer_id)
        .filter(listing_offers::Column::ListingId.eq(listing_id))
        .one(&txn)
        .await?
    else {
        txn.rollback().await?;
        return Err(SelectionError::OfferNotFound);
    };

    if offer.status == OfferStatus::Selected {
        txn.rollback().await?;
        return Ok(offer);
    }

    let now = Utc::now();

    ListingOffers::update_many()
        .col_expr(
            listing_offers::Column::Status,
            Expr::value(OfferStatus::Rejected),
        )
        .col_expr(
            listing_offers::Column::UpdatedAt,
            Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(now)),
        )
        .filter(listing_offers::Column::ListingId.eq(listing_id))
        .exec(&txn)
        .await?;

    let mut winner = offer.into_active_model();
    winner.status = Set(OfferStatus::Selected);
    winner.updated_at = Set(Some(now.into()));
    let winner = winner.update(&txn).await?;

    txn.commit().await?;

    info!(listing_id = %listing_id, offer_id = %offer_id, "winner selected");
    Ok(winner)
}
