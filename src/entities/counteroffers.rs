//! SeaORM entity for counteroffers.
//!
//! The second bidding shape: full amount/term/installment proposals made
//! from the listing detail page. Plain inserts, several per entrepreneur,
//! only accepted while the listing allows counteroffers.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub use super::listing_offers::OfferStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "counteroffers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub listing_id: Uuid,
    pub entrepreneur_user_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub amount: Decimal,
    pub term_months: i32,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub installment: Decimal,
    pub status: OfferStatus,
    pub created_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::listings::Entity",
        from = "Column::ListingId",
        to = "super::listings::Column::Id"
    )]
    Listing,
}

impl Related<super::listings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Listing.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
