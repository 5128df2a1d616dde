use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::domain::{normalize_phone, ScholarshipApplication};
use crate::workflows::approval::{ApprovalState, RecordId};
use crate::workflows::error::ServiceError;
use crate::workflows::validation::{present, Scalar, ValidationErrors};

const TEXT_MAX: usize = 255;
const PHONE_DIGITS: usize = 11;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScholarshipSubmission {
    pub scholarship_id: Option<Scalar>,
    pub applicant_name: Option<String>,
    pub applicant_email: Option<String>,
    pub applicant_phone: Option<String>,
    pub applicant_address: Option<String>,
    pub class_or_grade: Option<String>,
    pub school_name: Option<String>,
    pub parent_or_guardian_name: Option<String>,
    pub academic_proof_file: Option<String>,
    pub other_document_file: Option<String>,
    pub statement: Option<String>,
    pub applicant_signature: Option<String>,
}

impl ScholarshipSubmission {
    pub fn scholarship_id(&self) -> Option<RecordId> {
        self.scholarship_id
            .as_ref()
            .and_then(Scalar::as_i64)
            .and_then(|id| u64::try_from(id).ok())
            .map(RecordId)
    }

    /// `scholarship_known` is the catalog lookup for the requested programme.
    pub fn validate(
        self,
        scholarship_known: bool,
        user_id: Option<RecordId>,
        now: DateTime<Utc>,
    ) -> Result<ScholarshipApplication, ServiceError> {
        let mut errors = ValidationErrors::new();

        let scholarship_id = match self.scholarship_id.as_ref().filter(|raw| !raw.is_blank()) {
            Some(raw) => errors.integer("scholarship_id", Some(raw)),
            None => {
                errors.required("scholarship_id", None);
                None
            }
        };
        if scholarship_id.is_some() && !scholarship_known {
            errors.invalid_choice("scholarship_id");
        }
        let scholarship_id = scholarship_id.and_then(|id| u64::try_from(id).ok());
        let applicant_name = errors.required("applicant_name", self.applicant_name.as_deref());
        errors.max_len("applicant_name", applicant_name.as_deref(), TEXT_MAX);
        let applicant_email = present(self.applicant_email.as_deref());
        errors.max_len("applicant_email", applicant_email.as_deref(), TEXT_MAX);
        errors.email("applicant_email", applicant_email.as_deref());

        let applicant_phone = self
            .applicant_phone
            .as_deref()
            .map(normalize_phone)
            .filter(|phone| !phone.is_empty());
        let applicant_phone = errors.required("applicant_phone", applicant_phone.as_deref());
        if let Some(phone) = &applicant_phone {
            if phone.chars().count() != PHONE_DIGITS {
                errors.add(
                    "applicant_phone",
                    format!("The applicant phone field must be {PHONE_DIGITS} characters."),
                );
            }
        }
        for (field, value) in [
            ("class_or_grade", self.class_or_grade.as_deref()),
            ("school_name", self.school_name.as_deref()),
            ("parent_or_guardian_name", self.parent_or_guardian_name.as_deref()),
        ] {
            errors.max_len(field, value, TEXT_MAX);
        }
        let applicant_signature =
            errors.required("applicant_signature", self.applicant_signature.as_deref());

        errors.finish()?;

        let (Some(scholarship_id), Some(applicant_name), Some(applicant_phone), Some(applicant_signature)) = (
            scholarship_id,
            applicant_name,
            applicant_phone,
            applicant_signature,
        ) else {
            return Err(ValidationErrors::new().into());
        };

        Ok(ScholarshipApplication {
            id: RecordId::default(),
            scholarship_id: RecordId(scholarship_id),
            user_id,
            applicant_name,
            applicant_email,
            applicant_phone,
            applicant_address: present(self.applicant_address.as_deref()),
            class_or_grade: present(self.class_or_grade.as_deref()),
            school_name: present(self.school_name.as_deref()),
            parent_or_guardian_name: present(self.parent_or_guardian_name.as_deref()),
            academic_proof_file: present(self.academic_proof_file.as_deref()),
            other_document_file: present(self.other_document_file.as_deref()),
            statement: present(self.statement.as_deref()),
            applicant_signature,
            approval: ApprovalState::pending(),
            created_at: now,
            updated_at: now,
        })
    }
}
