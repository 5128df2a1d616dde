use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::approval::{
    Approvable, ApprovableKind, ApprovalState, Record, RecordId,
};
use crate::workflows::catalog::Scholarship;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScholarshipApplication {
    pub id: RecordId,
    pub scholarship_id: RecordId,
    pub user_id: Option<RecordId>,
    pub applicant_name: String,
    pub applicant_email: Option<String>,
    pub applicant_phone: String,
    pub applicant_address: Option<String>,
    pub class_or_grade: Option<String>,
    pub school_name: Option<String>,
    pub parent_or_guardian_name: Option<String>,
    pub academic_proof_file: Option<String>,
    pub other_document_file: Option<String>,
    pub statement: Option<String>,
    pub applicant_signature: String,
    #[serde(flatten)]
    pub approval: ApprovalState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for ScholarshipApplication {
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

impl Approvable for ScholarshipApplication {
    const KIND: ApprovableKind = ApprovableKind::ScholarshipApplication;
    const RECORDS_REJECTION_REASON: bool = true;

    fn approval(&self) -> &ApprovalState {
        &self.approval
    }

    fn approval_mut(&mut self) -> &mut ApprovalState {
        &mut self.approval
    }
}

/// Application with its programme attached, as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScholarshipApplicationView {
    #[serde(flatten)]
    pub application: ScholarshipApplication,
    pub scholarship: Option<Scholarship>,
}

/// Digits only; a 13-digit number with the `880` country code loses its
/// leading `88`.
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 13 && digits.starts_with("880") {
        digits[2..].to_string()
    } else {
        digits
    }
}
