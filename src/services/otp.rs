//! One-time phone codes.
//!
//! Codes are 6 digits, stored with an expiry, and single-use. Issuing a
//! new code invalidates any live code for the same phone first, so only
//! the latest SMS can verify.

use chrono::{Duration, Utc};
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, Set, sea_query::Expr,
};
use tracing::debug;
use uuid::Uuid;

use crate::entities::phone_otps;
use crate::entities::prelude::PhoneOtps;

pub const CODE_LEN: usize = 6;

#[derive(Clone)]
pub struct OtpService {
    ttl: Duration,
}

impl OtpService {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            ttl: Duration::seconds(ttl_secs),
        }
    }

    /// Issue a fresh code for this phone, invalidating earlier ones.
    /// Returns the code for delivery.
    pub async fn issue(
        &self,
        db: &DatabaseConnection,
        phone: &str,
    ) -> Result<String, sea_orm::DbErr> {
        PhoneOtps::update_many()
            .col_expr(phone_otps::Column::Consumed, Expr::value(true))
            .filter(phone_otps::Column::Phone.eq(phone))
            .filter(phone_otps::Column::Consumed.eq(false))
            .exec(db)
            .await?;

        let code = format!(
            "{:0width$}",
            rand::thread_rng().gen_range(0..1_000_000),
            width = CODE_LEN
        );
        let now = Utc::now();

        phone_otps::ActiveModel {
            id: Set(Uuid::new_v4()),
            phone: Set(phone.to_string()),
            code: Set(code.clone()),
            expires_at: Set((now + self.ttl).into()),
            consumed: Set(false),
            created_at: Set(Some(now.into())),
        }
        .insert(db)
        .await?;

        debug!(phone = %phone, "otp issued");
        Ok(code)
    }

    /// Consume a code. True when it matched, was unconsumed and unexpired.
    pub async fn verify(
        &self,
        db: &DatabaseConnection,
        phone: &str,
        code: &str,
    ) -> Result<bool, sea_orm::DbErr> {
        let found = PhoneOtps::find()
            .filter(phone_otps::Column::Phone.eq(phone))
            .filter(phone_otps::Column::Code.eq(code))
            .filter(phone_otps::Column::Consumed.eq(false))
            .one(db)
            .await?;

        let Some(row) = found else {
            return Ok(false);
        };

        if row.expires_at < Utc::now() {
            return Ok(false);
        }

        let mut consumed = row.into_active_model();
        consumed.consumed = Set(true);
        consumed.update(db).await?;

        Ok(true)
    }
}
