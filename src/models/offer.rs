//! Offer request/response models, both bidding shapes.

use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::counteroffers;
use crate::entities::listing_offers::{self, OfferStatus};

/// Body of POST /api/listings/{id}/offers: a commission bid. One live bid
/// per entrepreneur per listing; re-posting replaces it.
#[derive(Debug, Clone, Deserialize)]
pub struct CommissionOfferRequest {
    pub commission_amount: Decimal,
    pub message: Option<String>,
}

impl CommissionOfferRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.commission_amount <= Decimal::ZERO {
            return Err("commission_amount must be positive".to_string());
        }
        if let Some(message) = &self.message {
            if message.len() > 2000 {
                return Err("message cannot exceed 2000 characters".to_string());
            }
        }
        Ok(())
    }
}

/// Contact block shown to the owning investor next to each bid
#[derive(Debug, Clone, Serialize)]
pub struct EntrepreneurInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dni: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommissionOfferEntry {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub entrepreneur_user_id: Uuid,
    pub commission_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub status: OfferStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTimeWithTimeZone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entrepreneur: Option<EntrepreneurInfo>,
}

impl CommissionOfferEntry {
    pub fn from_model(model: listing_offers::Model, entrepreneur: Option<EntrepreneurInfo>) -> Self {
        Self {
            id: model.id,
            listing_id: model.listing_id,
            entrepreneur_user_id: model.entrepreneur_user_id,
            commission_amount: model.commission_amount,
            message: model.message,
            status: model.status,
            created_at: model.created_at,
            entrepreneur,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommissionOffersResponse {
    pub offers: Vec<CommissionOfferEntry>,
}

/// Body of POST /api/listings/{id}/counteroffers: a full
/// amount/term/installment proposal.
#[derive(Debug, Clone, Deserialize)]
pub struct CounterofferRequest {
    pub amount: Decimal,
    pub term_months: i32,
    pub installment: Decimal,
}

impl CounterofferRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.amount <= Decimal::ZERO {
            return Err("amount must be positive".to_string());
        }
        if self.installment <= Decimal::ZERO {
            return Err("installment must be positive".to_string());
        }
        if self.term_months < 1 || self.term_months > 120 {
            return Err("term_months must be between 1 and 120".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CounterofferEntry {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub entrepreneur_user_id: Uuid,
    pub amount: Decimal,
    pub term_months: i32,
    pub installment: Decimal,
    pub status: OfferStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTimeWithTimeZone>,
}

impl From<counteroffers::Model> for CounterofferEntry {
    fn from(model: counteroffers::Model) -> Self {
        Self {
            id: model.id,
            listing_id: model.listing_id,
            entrepreneur_user_id: model.entrepreneur_user_id,
            amount: model.amount,
            term_months: model.term_months,
            installment: model.installment,
            status: model.status,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CounteroffersResponse {
    pub counteroffers: Vec<CounterofferEntry>,
}
