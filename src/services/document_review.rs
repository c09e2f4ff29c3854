//! Admin document review.
//!
//! The status write, the gate re-check and the resulting activation all
//! happen in one transaction: if stamping the auction window fails, the
//! approval rolls back with it and the admin retries the whole action.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::documents::{self, DocumentStatus};
use crate::entities::listings;
use crate::entities::prelude::Documents;
use crate::services::document_gate::{self, GateOutcome};
use crate::services::lifecycle;

#[derive(Debug)]
pub enum ReviewError {
    DocumentNotFound,
    /// Only pending documents can be reviewed
    AlreadyReviewed(DocumentStatus),
    Db(sea_orm::DbErr),
}

impl std::fmt::Display for ReviewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewError::DocumentNotFound => write!(f, "document not found"),
            ReviewError::AlreadyReviewed(status) => {
                write!(f, "document already reviewed ({:?})", status)
            }
            ReviewError::Db(e) => write!(f, "database error: {}", e),
        }
    }
}

impl std::error::Error for ReviewError {}

impl From<sea_orm::DbErr> for ReviewError {
    fn from(e: sea_orm::DbErr) -> Self {
        ReviewError::Db(e)
    }
}

pub struct ReviewResult {
    pub document: documents::Model,
    pub gate: GateOutcome,
    /// Set when this review flipped the listing to active
    pub activated: Option<listings::Model>,
}

/// Apply an admin decision to a pending document.
pub async fn review_document(
    db: &DatabaseConnection,
    document_id: Uuid,
    decision: DocumentStatus,
    note: Option<String>,
    reviewer_id: Uuid,
) -> Result<ReviewResult, ReviewError> {
    debug_assert!(decision != DocumentStatus::Pending);

    let txn = db.begin().await?;

    let Some(document) = Documents::find_by_id(document_id).one(&txn).await? else {
        txn.rollback().await?;
        return Err(ReviewError::DocumentNotFound);
    };

    if document.status != DocumentStatus::Pending {
        let status = document.status;
        txn.rollback().await?;
        return Err(ReviewError::AlreadyReviewed(status));
    }

    let vehicle_id = document.vehicle_id;

    let mut reviewed = document.into_active_model();
    reviewed.status = Set(decision);
    reviewed.admin_notes = Set(note);
    reviewed.reviewed_by = Set(Some(reviewer_id));
    reviewed.reviewed_at = Set(Some(Utc::now().into()));
    let document = reviewed.update(&txn).await?;

    let gate = document_gate::evaluate_for_vehicle(&txn, vehicle_id).await?;

    let activated = if gate.is_ready() {
        lifecycle::try_auto_activate(&txn, vehicle_id).await?
    } else {
        None
    };

    txn.commit().await?;

    info!(
        document_id = %document_id,
        vehicle_id = %vehicle_id,
        decision = ?decision,
        activated = activated.is_some(),
        "document reviewed"
    );

    Ok(ReviewResult {
        document,
        gate,
        activated,
    })
}
