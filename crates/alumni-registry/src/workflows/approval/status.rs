use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identity::ActorId;

/// Tri-state decision status shared by every approvable record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "PENDING",
            ApprovalStatus::Approved => "APPROVED",
            ApprovalStatus::Rejected => "REJECTED",
        }
    }

    pub const fn is_decided(self) -> bool {
        !matches!(self, ApprovalStatus::Pending)
    }
}

/// The four record families that pass through the approval workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovableKind {
    MembershipApplication,
    Payment,
    ScholarshipApplication,
    SelfDeclaration,
}

impl ApprovableKind {
    pub const fn label(self) -> &'static str {
        match self {
            ApprovableKind::MembershipApplication => "membership_application",
            ApprovableKind::Payment => "payment",
            ApprovableKind::ScholarshipApplication => "scholarship_application",
            ApprovableKind::SelfDeclaration => "self_declaration",
        }
    }

    /// Message returned when a decided record is decided again.
    pub const fn not_pending_message(self) -> &'static str {
        match self {
            ApprovableKind::MembershipApplication | ApprovableKind::ScholarshipApplication => {
                "Application is not pending approval."
            }
            ApprovableKind::Payment => "Payment is not pending approval.",
            ApprovableKind::SelfDeclaration => "Self-declaration is not pending approval.",
        }
    }

    pub const fn not_found_message(self) -> &'static str {
        match self {
            ApprovableKind::MembershipApplication | ApprovableKind::ScholarshipApplication => {
                "Application not found."
            }
            ApprovableKind::Payment => "Payment not found.",
            ApprovableKind::SelfDeclaration => "Self-declaration not found.",
        }
    }
}

/// Audit fields stamped by a decision. Flattened into each record's JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalState {
    pub status: ApprovalStatus,
    pub approved_by: Option<ActorId>,
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_reason: Option<String>,
}

impl ApprovalState {
    pub fn pending() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.status == ApprovalStatus::Pending
    }
}

/// What an authorized reviewer asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject { reason: Option<String> },
}

impl Decision {
    pub const fn target(&self) -> ApprovalStatus {
        match self {
            Decision::Approve => ApprovalStatus::Approved,
            Decision::Reject { .. } => ApprovalStatus::Rejected,
        }
    }
}

/// Optional body of a reject request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RejectRequest {
    #[serde(default)]
    pub rejected_reason: Option<String>,
}

impl RejectRequest {
    pub fn into_decision(self) -> Decision {
        Decision::Reject {
            reason: self
                .rejected_reason
                .map(|reason| reason.trim().to_string())
                .filter(|reason| !reason.is_empty()),
        }
    }
}

/// Implemented by each record type carrying an [`ApprovalState`].
pub trait Approvable {
    const KIND: ApprovableKind;
    /// Whether a rejection reason is kept on this record type.
    const RECORDS_REJECTION_REASON: bool;

    fn approval(&self) -> &ApprovalState;
    fn approval_mut(&mut self) -> &mut ApprovalState;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("{} is already {}", kind.label(), status.label())]
    NotPending {
        kind: ApprovableKind,
        status: ApprovalStatus,
    },
}

impl TransitionError {
    pub const fn kind(&self) -> ApprovableKind {
        match self {
            TransitionError::NotPending { kind, .. } => *kind,
        }
    }
}

/// Moves a pending record to its decided state, stamping the reviewer and time
/// together. A decided record is left untouched.
pub fn transition<T: Approvable>(
    record: &mut T,
    decision: &Decision,
    actor: &ActorId,
    at: DateTime<Utc>,
) -> Result<(), TransitionError> {
    let current = record.approval().status;
    if current != ApprovalStatus::Pending {
        return Err(TransitionError::NotPending {
            kind: T::KIND,
            status: current,
        });
    }

    let reason = match decision {
        Decision::Reject { reason } if T::RECORDS_REJECTION_REASON => reason.clone(),
        _ => None,
    };

    *record.approval_mut() = ApprovalState {
        status: decision.target(),
        approved_by: Some(actor.clone()),
        approved_at: Some(at),
        rejected_reason: reason,
    };
    Ok(())
}

/// Entity-specific work carried out once a decision has committed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum SideEffect {
    MemberProvisioned {
        user_id: u64,
        member_id: String,
        membership_expires_at: Option<DateTime<Utc>>,
    },
    ReceiptIssued {
        receipt_file: String,
    },
    SecondaryTypeAssigned {
        user_id: u64,
        secondary_member_type_id: u64,
    },
    None,
}
