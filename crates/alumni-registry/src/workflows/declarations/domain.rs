use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::approval::{Approvable, ApprovableKind, ApprovalState, Record, RecordId};
use crate::workflows::catalog::MemberType;
use crate::workflows::members::AccountSummary;

/// A member's claim to a committee role, pending review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfDeclaration {
    pub id: RecordId,
    pub user_id: RecordId,
    pub name: String,
    pub signature_file: String,
    pub secondary_member_type_id: RecordId,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub approval: ApprovalState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for SelfDeclaration {
    fn id(&self) -> RecordId {
        self.id
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Approvable for SelfDeclaration {
    const KIND: ApprovableKind = ApprovableKind::SelfDeclaration;
    const RECORDS_REJECTION_REASON: bool = true;

    fn approval(&self) -> &ApprovalState {
        &self.approval
    }

    fn approval_mut(&mut self) -> &mut ApprovalState {
        &mut self.approval
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelfDeclarationView {
    #[serde(flatten)]
    pub declaration: SelfDeclaration,
    pub user: Option<AccountSummary>,
    pub secondary_member_type: Option<MemberType>,
}
