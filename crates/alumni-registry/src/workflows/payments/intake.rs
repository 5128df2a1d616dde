use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::domain::{Payment, PaymentPurpose};
use crate::workflows::approval::{ApprovalState, RecordId};
use crate::workflows::error::ServiceError;
use crate::workflows::validation::{present, Scalar, ValidationErrors};

const NAME_MAX: usize = 255;
const MOBILE_MAX: usize = 20;
const UNKNOWN_MEMBER: &str = "The selected member id is invalid.";

/// Payer details taken from the signed-in account when the form omits them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayerDefaults {
    pub name: Option<String>,
    pub member_id: Option<String>,
    pub address: Option<String>,
    pub mobile_number: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PaymentSubmission {
    pub member_id: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub mobile_number: Option<String>,
    pub payment_purpose: Option<String>,
    pub payment_method: Option<String>,
    pub payment_amount: Option<Scalar>,
    pub payment_proof_file: Option<String>,
}

impl PaymentSubmission {
    pub fn member_id(&self) -> Option<String> {
        present(self.member_id.as_deref())
    }

    /// Anonymous payers must identify themselves; signed-in payers fall back
    /// to `defaults`. `member_known` is the lookup result for a supplied member ID.
    pub fn validate(
        self,
        defaults: Option<PayerDefaults>,
        member_known: Option<bool>,
        now: DateTime<Utc>,
    ) -> Result<Payment, ServiceError> {
        let mut errors = ValidationErrors::new();
        let authenticated = defaults.is_some();
        let defaults = defaults.unwrap_or_default();

        if member_known == Some(false) {
            errors.add("member_id", UNKNOWN_MEMBER);
        }
        let name = payer_field(&mut errors, "name", self.name.as_deref(), Some(NAME_MAX), authenticated);
        let address = payer_field(&mut errors, "address", self.address.as_deref(), None, authenticated);
        let mobile_number = payer_field(
            &mut errors,
            "mobile_number",
            self.mobile_number.as_deref(),
            Some(MOBILE_MAX),
            authenticated,
        );
        let payment_purpose = purpose(&mut errors, self.payment_purpose.as_deref());
        errors.max_len("payment_method", self.payment_method.as_deref(), NAME_MAX);
        let payment_amount = match self.payment_amount.as_ref().filter(|raw| !raw.is_blank()) {
            Some(raw) => errors.amount("payment_amount", Some(raw)),
            None => {
                errors.required("payment_amount", None);
                None
            }
        };
        let payment_proof_file = errors.required("payment_proof_file", self.payment_proof_file.as_deref());

        errors.finish()?;

        let (Some(payment_purpose), Some(payment_amount), Some(payment_proof_file)) =
            (payment_purpose, payment_amount, payment_proof_file)
        else {
            return Err(ValidationErrors::new().into());
        };

        Ok(Payment {
            id: RecordId::default(),
            member_id: present(self.member_id.as_deref()).or(defaults.member_id),
            name: name.or(defaults.name).unwrap_or_default(),
            address: address.or(defaults.address).unwrap_or_default(),
            mobile_number: mobile_number.or(defaults.mobile_number).unwrap_or_default(),
            payment_purpose,
            payment_method: present(self.payment_method.as_deref()),
            payment_amount,
            payment_proof_file,
            receipt_file: None,
            approval: ApprovalState::pending(),
            created_at: now,
            updated_at: now,
        })
    }
}

fn payer_field(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
    max: Option<usize>,
    optional: bool,
) -> Option<String> {
    let value = if optional {
        present(value)
    } else {
        errors.required(field, value)
    }?;
    if let Some(max) = max {
        errors.max_len(field, Some(&value), max);
    }
    Some(value)
}

fn purpose(errors: &mut ValidationErrors, value: Option<&str>) -> Option<PaymentPurpose> {
    errors.required("payment_purpose", value)?;
    errors.choice("payment_purpose", value)
}

fn sometimes_field(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
    max: Option<usize>,
) -> Option<String> {
    value.and_then(|value| payer_field(errors, field, Some(value), max, false))
}

/// Administrator correction of payer fields. Absent fields are kept.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PaymentUpdate {
    pub member_id: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub mobile_number: Option<String>,
    pub payment_purpose: Option<String>,
    pub payment_method: Option<String>,
    pub payment_amount: Option<Scalar>,
    pub payment_proof_file: Option<String>,
}

impl PaymentUpdate {
    pub fn member_id(&self) -> Option<String> {
        present(self.member_id.as_deref())
    }

    pub fn apply(
        self,
        payment: &mut Payment,
        member_known: Option<bool>,
        now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        let mut errors = ValidationErrors::new();

        if member_known == Some(false) {
            errors.add("member_id", UNKNOWN_MEMBER);
        }
        let name = sometimes_field(&mut errors, "name", self.name.as_deref(), Some(NAME_MAX));
        let address = sometimes_field(&mut errors, "address", self.address.as_deref(), None);
        let mobile_number = sometimes_field(
            &mut errors,
            "mobile_number",
            self.mobile_number.as_deref(),
            Some(MOBILE_MAX),
        );
        let payment_purpose = self
            .payment_purpose
            .as_deref()
            .and_then(|raw| purpose(&mut errors, Some(raw)));
        errors.max_len("payment_method", self.payment_method.as_deref(), NAME_MAX);
        let payment_amount = match self.payment_amount.as_ref() {
            Some(raw) if raw.is_blank() => {
                errors.required("payment_amount", None);
                None
            }
            Some(raw) => errors.amount("payment_amount", Some(raw)),
            None => None,
        };
        let payment_proof_file = present(self.payment_proof_file.as_deref());

        errors.finish()?;

        if let Some(member_id) = self.member_id {
            payment.member_id = present(Some(member_id.as_str()));
        }
        if let Some(value) = name {
            payment.name = value;
        }
        if let Some(value) = address {
            payment.address = value;
        }
        if let Some(value) = mobile_number {
            payment.mobile_number = value;
        }
        if let Some(value) = payment_purpose {
            payment.payment_purpose = value;
        }
        if let Some(value) = self.payment_method {
            payment.payment_method = present(Some(value.as_str()));
        }
        if let Some(value) = payment_amount {
            payment.payment_amount = value;
        }
        if let Some(value) = payment_proof_file {
            payment.payment_proof_file = value;
        }
        payment.updated_at = now;
        Ok(())
    }
}
