//! SeaORM entity for user profiles.
//!
//! One row per authenticated identity. The role decides which dashboard
//! the identity sees and which write operations it may perform; switching
//! role updates this row in place and never creates a second one.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    /// Identity key from the gateway; also the primary key
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// None until the user has picked a role
    pub role: Option<Role>,
    pub full_name: Option<String>,
    pub created_at: Option<DateTimeWithTimeZone>,
    pub updated_at: Option<DateTimeWithTimeZone>,
}

/// Capability tag attached to an identity
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[sea_orm(string_value = "investor")]
    Investor,
    #[sea_orm(string_value = "entrepreneur")]
    Entrepreneur,
    #[sea_orm(string_value = "admin")]
    Admin,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
