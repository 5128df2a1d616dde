use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use super::domain::SelfDeclaration;
use crate::workflows::approval::{ApprovalState, RecordId};
use crate::workflows::error::ServiceError;
use crate::workflows::validation::{present, Scalar, ValidationErrors};

const NAME_MAX: usize = 255;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeclarationSubmission {
    pub name: Option<String>,
    pub signature_file: Option<String>,
    pub secondary_member_type_id: Option<Scalar>,
    pub date: Option<String>,
}

/// Accepts a calendar date or a full timestamp, keeping only the day.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|at| at.date_naive()))
}

impl DeclarationSubmission {
    pub fn secondary_member_type_id(&self) -> Option<RecordId> {
        self.secondary_member_type_id
            .as_ref()
            .and_then(Scalar::as_i64)
            .and_then(|id| u64::try_from(id).ok())
            .map(RecordId)
    }

    pub fn validate(
        self,
        user_id: RecordId,
        member_type_known: bool,
        now: DateTime<Utc>,
    ) -> Result<SelfDeclaration, ServiceError> {
        let mut errors = ValidationErrors::new();

        let name = errors.required("name", self.name.as_deref());
        errors.max_len("name", name.as_deref(), NAME_MAX);
        let signature_file = errors.required("signature_file", self.signature_file.as_deref());

        let member_type = match self
            .secondary_member_type_id
            .as_ref()
            .filter(|raw| !raw.is_blank())
        {
            Some(raw) => errors.integer("secondary_member_type_id", Some(raw)),
            None => {
                errors.required("secondary_member_type_id", None);
                None
            }
        };
        if member_type.is_some() && !member_type_known {
            errors.invalid_choice("secondary_member_type_id");
        }
        let member_type = member_type.and_then(|id| u64::try_from(id).ok());

        let date = errors.required("date", self.date.as_deref()).and_then(|raw| {
            let parsed = parse_date(&raw);
            if parsed.is_none() {
                errors.add("date", "The date field must be a valid date.");
            }
            parsed
        });

        errors.finish()?;

        let (Some(name), Some(signature_file), Some(member_type), Some(date)) =
            (name, signature_file, member_type, date)
        else {
            return Err(ValidationErrors::new().into());
        };

        Ok(SelfDeclaration {
            id: RecordId::default(),
            user_id,
            name,
            signature_file,
            secondary_member_type_id: RecordId(member_type),
            date,
            approval: ApprovalState::pending(),
            created_at: now,
            updated_at: now,
        })
    }
}
