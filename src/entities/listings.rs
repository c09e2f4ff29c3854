//! SeaORM entity for listings.
//!
//! A listing ties one vehicle to one investor with the financing terms on
//! offer. Its status is the lifecycle the rest of the system revolves
//! around: `pending_docs` until the gating documents are approved, then
//! `active` with a stamped 7-day auction window, with `paused` and
//! `closed` as the owner-driven states.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "listings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// One listing per vehicle (unique in the schema)
    pub vehicle_id: Uuid,
    pub investor_user_id: Uuid,
    /// Lease principal
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub base_amount: Decimal,
    pub base_term_months: i32,
    /// Suggested monthly installment
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub base_installment: Decimal,
    /// Whether entrepreneurs may bid their own amount/term/installment
    pub allow_counteroffers: bool,
    pub status: ListingStatus,
    /// Stamped on activation; None while the listing has never been active
    pub auction_starts_at: Option<DateTimeWithTimeZone>,
    /// Always auction_starts_at + 7 days
    pub auction_ends_at: Option<DateTimeWithTimeZone>,
    pub created_at: Option<DateTimeWithTimeZone>,
    pub updated_at: Option<DateTimeWithTimeZone>,
}

/// Lifecycle status of a listing
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    /// Waiting for the gating documents to be approved
    #[sea_orm(string_value = "pending_docs")]
    PendingDocs,
    #[sea_orm(string_value = "paused")]
    Paused,
    /// Auction live, window stamped
    #[sea_orm(string_value = "active")]
    Active,
    /// Terminal
    #[sea_orm(string_value = "closed")]
    Closed,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vehicles::Entity",
        from = "Column::VehicleId",
        to = "super::vehicles::Column::Id"
    )]
    Vehicle,
    #[sea_orm(has_many = "super::listing_offers::Entity")]
    ListingOffers,
    #[sea_orm(has_many = "super::counteroffers::Entity")]
    Counteroffers,
}

impl Related<super::vehicles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicle.def()
    }
}

impl Related<super::listing_offers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ListingOffers.def()
    }
}

impl Related<super::counteroffers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Counteroffers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
