//! Document approval gate.
//!
//! Decides, from the review statuses of a vehicle's documents, whether its
//! listing may go live. Exactly two document types gate activation; SOAT
//! and technical review are recorded but carry no weight here. Rejection
//! dominates: one rejected gating document marks the vehicle rejected even
//! when the other is approved, so the owner sees why instead of a bare
//! "not ready".

use std::collections::HashMap;

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::documents::{self, DocumentStatus, DocumentType};
use crate::entities::prelude::Documents;

/// Document types that must be approved before a listing may activate
pub const REQUIRED_DOC_TYPES: [DocumentType; 2] =
    [DocumentType::PropertyCard, DocumentType::VehiclePhoto];

/// Gate verdict for one vehicle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GateOutcome {
    /// Both gating documents approved
    Ready,
    /// At least one gating document rejected
    Rejected { rejected: Vec<DocumentType> },
    /// Nothing rejected, but something is absent or still in review
    Incomplete {
        missing: Vec<DocumentType>,
        pending: Vec<DocumentType>,
    },
}

impl GateOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, GateOutcome::Ready)
    }

    /// Short label for dashboard cards
    pub fn label(&self) -> &'static str {
        match self {
            GateOutcome::Ready => "approved",
            GateOutcome::Rejected { .. } => "rejected",
            GateOutcome::Incomplete { .. } => "in_review",
        }
    }
}

/// Evaluate the gate from a (doc type -> status) map
pub fn evaluate(statuses: &HashMap<DocumentType, DocumentStatus>) -> GateOutcome {
    let mut rejected = Vec::new();
    let mut missing = Vec::new();
    let mut pending = Vec::new();

    for doc_type in REQUIRED_DOC_TYPES {
        match statuses.get(&doc_type) {
            Some(DocumentStatus::Approved) => {}
            Some(DocumentStatus::Rejected) => rejected.push(doc_type),
            Some(DocumentStatus::Pending) => pending.push(doc_type),
            None => missing.push(doc_type),
        }
    }

    if !rejected.is_empty() {
        GateOutcome::Rejected { rejected }
    } else if !missing.is_empty() || !pending.is_empty() {
        GateOutcome::Incomplete { missing, pending }
    } else {
        GateOutcome::Ready
    }
}

/// Build the status map from a vehicle's document rows
pub fn status_map(docs: &[documents::Model]) -> HashMap<DocumentType, DocumentStatus> {
    docs.iter().map(|d| (d.doc_type, d.status)).collect()
}

/// Fetch a vehicle's documents and evaluate the gate.
///
/// Generic over the connection so it can run inside the same transaction
/// as a document-status write.
pub async fn evaluate_for_vehicle<C: ConnectionTrait>(
    conn: &C,
    vehicle_id: Uuid,
) -> Result<GateOutcome, sea_orm::DbErr> {
    let docs = Documents::find()
        .filter(documents::Column::VehicleId.eq(vehicle_id))
        .all(conn)
        .await?;

    Ok(evaluate(&status_map(&docs)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statuses(
        property_card: Option<DocumentStatus>,
        vehicle_photo: Option<DocumentStatus>,
    ) -> HashMap<DocumentType, DocumentStatus> {
        let mut map = HashMap::new();
        if let Some(s) = property_card {
            map.insert(DocumentType::PropertyCard, s);
        }
        if let Some(s) = vehicle_photo {
            map.insert(DocumentType::VehiclePhoto, s);
        }
        map
    }

    #[test]
    fn both_approved_is_ready() {
        let outcome = evaluate(&statuses(
            Some(DocumentStatus::Approved),
            Some(DocumentStatus::Approved),
        ));
        assert_eq!(outcome, GateOutcome::Ready);
        assert!(outcome.is_ready());
    }

    #[test]
    fn pending_plus_approved_is_incomplete() {
        let outcome = evaluate(&statuses(
            Some(DocumentStatus::Pending),
            Some(DocumentStatus::Approved),
        ));
        assert_eq!(
            outcome,
            GateOutcome::Incomplete {
                missing: vec![],
                pending: vec![DocumentType::PropertyCard],
            }
        );
    }

    #[test]
    fn missing_document_is_incomplete() {
        let outcome = evaluate(&statuses(None, Some(DocumentStatus::Approved)));
        assert_eq!(
            outcome,
            GateOutcome::Incomplete {
                missing: vec![DocumentType::PropertyCard],
                pending: vec![],
            }
        );
    }

    #[test]
    fn rejection_dominates_approval() {
        let outcome = evaluate(&statuses(
            Some(DocumentStatus::Rejected),
            Some(DocumentStatus::Approved),
        ));
        assert_eq!(
            outcome,
            GateOutcome::Rejected {
                rejected: vec![DocumentType::PropertyCard],
            }
        );
    }

    #[test]
    fn rejection_dominates_pending() {
        let outcome = evaluate(&statuses(
            Some(DocumentStatus::Pending),
            Some(DocumentStatus::Rejected),
        ));
        assert_eq!(
            outcome,
            GateOutcome::Rejected {
                rejected: vec![DocumentType::VehiclePhoto],
            }
        );
    }

    #[test]
    fn non_gating_types_are_ignored() {
        let mut map = statuses(
            Some(DocumentStatus::Approved),
            Some(DocumentStatus::Approved),
        );
        map.insert(DocumentType::Soat, DocumentStatus::Rejected);
        map.insert(DocumentType::TechnicalReview, DocumentStatus::Pending);

        assert_eq!(evaluate(&map), GateOutcome::Ready);
    }

    #[test]
    fn empty_map_reports_both_missing() {
        let outcome = evaluate(&HashMap::new());
        assert_eq!(
            outcome,
            GateOutcome::Incomplete {
                missing: vec![DocumentType::PropertyCard, DocumentType::VehiclePhoto],
                pending: vec![],
            }
        );
    }
}
