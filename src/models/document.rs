//! Document request/response models.

use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::documents::{self, DocumentStatus, DocumentType};
use crate::models::listing::ListingSummary;
use crate::services::document_gate::GateOutcome;

/// Body of PUT /api/vehicles/{vehicle_id}/documents.
///
/// The file itself lives in the external bucket; this only registers the
/// reference. Re-submitting a type replaces the previous row and puts it
/// back in review.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitDocumentRequest {
    pub doc_type: DocumentType,
    pub file_path: String,
}

impl SubmitDocumentRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.file_path.trim().is_empty() {
            return Err("file_path is required".to_string());
        }
        if self.file_path.len() > 512 {
            return Err("file_path cannot exceed 512 characters".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub owner_user_id: Uuid,
    pub doc_type: DocumentType,
    pub file_path: String,
    pub status: DocumentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTimeWithTimeZone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTimeWithTimeZone>,
}

impl From<documents::Model> for DocumentResponse {
    fn from(model: documents::Model) -> Self {
        Self {
            id: model.id,
            vehicle_id: model.vehicle_id,
            owner_user_id: model.owner_user_id,
            doc_type: model.doc_type,
            file_path: model.file_path,
            status: model.status,
            admin_notes: model.admin_notes,
            reviewed_by: model.reviewed_by,
            reviewed_at: model.reviewed_at,
            created_at: model.created_at,
        }
    }
}

/// Query parameters for the admin review queue.
///
/// Defaults to pending documents only; `all=true` lifts that.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentQuery {
    pub vehicle_id: Option<Uuid>,
    pub status: Option<DocumentStatus>,
    pub all: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentResponse>,
}

/// Admin decision on one pending document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

impl From<ReviewDecision> for DocumentStatus {
    fn from(decision: ReviewDecision) -> Self {
        match decision {
            ReviewDecision::Approved => DocumentStatus::Approved,
            ReviewDecision::Rejected => DocumentStatus::Rejected,
        }
    }
}

/// Body of PUT /api/documents/{id}/review
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewDocumentRequest {
    pub decision: ReviewDecision,
    /// Usually the rejection reason
    pub note: Option<String>,
}

impl ReviewDocumentRequest {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(note) = &self.note {
            if note.len() > 2000 {
                return Err("note cannot exceed 2000 characters".to_string());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct ReviewDocumentResponse {
    pub document: DocumentResponse,
    /// Gate verdict for the vehicle after this review
    pub gate: GateOutcome,
    /// True when this review flipped the listing to active
    pub activated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing: Option<ListingSummary>,
}
