//! Listing request/response models.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::documents::{DocumentStatus, DocumentType};
use crate::entities::listings::{self, ListingStatus};
use crate::entities::vehicles;
use crate::models::offer::CounterofferEntry;
use crate::services::document_gate::GateOutcome;

/// Body of POST /api/listings: the vehicle and its financing terms in one
/// shot, created together in one transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateListingRequest {
    /// Registration plate, optional
    pub plate: Option<String>,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub base_amount: Decimal,
    pub base_term_months: i32,
    /// Suggested monthly installment
    pub base_installment: Decimal,
    /// Defaults to true
    pub allow_counteroffers: Option<bool>,
}

impl CreateListingRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.make.trim().is_empty() {
            return Err("make is required".to_string());
        }
        if self.model.trim().is_empty() {
            return Err("model is required".to_string());
        }
        if self.year < 1950 || self.year > 2100 {
            return Err("year is out of range".to_string());
        }
        if self.base_amount <= Decimal::ZERO {
            return Err("base_amount must be positive".to_string());
        }
        if self.base_installment <= Decimal::ZERO {
            return Err("base_installment must be positive".to_string());
        }
        if self.base_term_months < 1 || self.base_term_months > 120 {
            return Err("base_term_months must be between 1 and 120".to_string());
        }
        Ok(())
    }
}

/// Query parameters for the marketplace listing
#[derive(Debug, Clone, Deserialize)]
pub struct ListingQuery {
    /// Maximum number of results (default: 20, max: 100)
    pub limit: Option<i32>,
    /// Offset for pagination (default: 0)
    pub offset: Option<i32>,
    /// Case-insensitive match on the vehicle make
    pub make: Option<String>,
}

impl ListingQuery {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(limit) = self.limit {
            if limit < 1 {
                return Err("limit must be at least 1".to_string());
            }
            if limit > 100 {
                return Err("limit cannot exceed 100".to_string());
            }
        }
        if let Some(offset) = self.offset {
            if offset < 0 {
                return Err("offset cannot be negative".to_string());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VehicleDto {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plate: Option<String>,
    pub make: String,
    pub model: String,
    pub year: i32,
}

impl From<vehicles::Model> for VehicleDto {
    fn from(model: vehicles::Model) -> Self {
        Self {
            id: model.id,
            plate: model.plate,
            make: model.make,
            model: model.model,
            year: model.year,
        }
    }
}

/// One listing with its vehicle
#[derive(Debug, Clone, Serialize)]
pub struct ListingEntry {
    pub id: Uuid,
    pub vehicle: VehicleDto,
    pub investor_user_id: Uuid,
    pub base_amount: Decimal,
    pub base_term_months: i32,
    pub base_installment: Decimal,
    pub allow_counteroffers: bool,
    pub status: ListingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auction_starts_at: Option<DateTimeWithTimeZone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auction_ends_at: Option<DateTimeWithTimeZone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTimeWithTimeZone>,
}

impl ListingEntry {
    pub fn from_parts(listing: listings::Model, vehicle: vehicles::Model) -> Self {
        Self {
            id: listing.id,
            vehicle: vehicle.into(),
            investor_user_id: listing.investor_user_id,
            base_amount: listing.base_amount,
            base_term_months: listing.base_term_months,
            base_installment: listing.base_installment,
            allow_counteroffers: listing.allow_counteroffers,
            status: listing.status,
            auction_starts_at: listing.auction_starts_at,
            auction_ends_at: listing.auction_ends_at,
            created_at: listing.created_at,
        }
    }
}

/// Compact listing shape used where the whole entry is overkill
#[derive(Debug, Clone, Serialize)]
pub struct ListingSummary {
    pub id: Uuid,
    pub status: ListingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auction_starts_at: Option<DateTimeWithTimeZone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auction_ends_at: Option<DateTimeWithTimeZone>,
}

impl From<listings::Model> for ListingSummary {
    fn from(model: listings::Model) -> Self {
        Self {
            id: model.id,
            status: model.status,
            auction_starts_at: model.auction_starts_at,
            auction_ends_at: model.auction_ends_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListingListResponse {
    pub listings: Vec<ListingEntry>,
    pub total: u64,
    pub limit: i32,
    pub offset: i32,
}

/// Owner dashboard entry: the listing plus where its paperwork stands
#[derive(Debug, Serialize)]
pub struct OwnedListingEntry {
    #[serde(flatten)]
    pub listing: ListingEntry,
    /// Per-type review status for everything submitted so far
    pub documents: HashMap<DocumentType, DocumentStatus>,
    pub gate: GateOutcome,
}

#[derive(Debug, Serialize)]
pub struct OwnedListingsResponse {
    pub listings: Vec<OwnedListingEntry>,
}

#[derive(Debug, Serialize)]
pub struct ListingDetailResponse {
    #[serde(flatten)]
    pub listing: ListingEntry,
    pub counteroffers: Vec<CounterofferEntry>,
}

/// Body of PUT /api/listings/{id}/status
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateListingStatusRequest {
    pub status: ListingStatus,
}

/// Admin review queue entry with aggregate counters
#[derive(Debug, Serialize)]
pub struct AdminListingsResponse {
    pub listings: Vec<AdminListingEntry>,
    pub stats: AdminListingStats,
}

#[derive(Debug, Serialize)]
pub struct AdminListingEntry {
    #[serde(flatten)]
    pub listing: ListingEntry,
    pub documents: HashMap<DocumentType, DocumentStatus>,
    pub gate: GateOutcome,
}

#[derive(Debug, Serialize)]
pub struct AdminListingStats {
    pub total: usize,
    /// Gate still incomplete (missing or pending documents)
    pub pending_review: usize,
    /// Gate passed but listing not yet active
    pub ready: usize,
    pub active: usize,
}
