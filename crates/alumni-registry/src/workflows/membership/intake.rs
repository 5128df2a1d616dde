use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::domain::{
    BloodGroup, Gender, MembershipApplication, MembershipType, PaymentYears,
    StudentshipProofType, TShirtSize,
};
use super::fees;
use crate::workflows::approval::{ApprovalState, RecordId};
use crate::workflows::error::ServiceError;
use crate::workflows::validation::{present, Scalar, ValidationErrors};

const TEXT_MAX: usize = 255;
const MOBILE_MAX: usize = 20;
const EARLIEST_PASSING_YEAR: i64 = 1900;

/// Public application form. Every field is optional here so that missing
/// input is reported per field. Wrongly typed values are caught earlier by
/// `JsonForm` and reported against their field as well.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MembershipSubmission {
    pub membership_type: Option<String>,
    pub full_name: Option<String>,
    pub name_bangla: Option<String>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub gender: Option<String>,
    pub jsc_year: Option<Scalar>,
    pub ssc_year: Option<Scalar>,
    pub studentship_proof_type: Option<String>,
    pub studentship_proof_file: Option<String>,
    pub highest_educational_degree: Option<String>,
    pub present_address: Option<String>,
    pub permanent_address: Option<String>,
    pub email: Option<String>,
    pub mobile_number: Option<String>,
    pub profession: Option<String>,
    pub designation: Option<String>,
    pub institute_name: Option<String>,
    pub t_shirt_size: Option<String>,
    pub blood_group: Option<String>,
    pub photo: Option<String>,
    pub signature: Option<String>,
    pub entry_fee: Option<Scalar>,
    pub payment_years: Option<Scalar>,
    pub payment_method: Option<String>,
    pub receipt_file: Option<String>,
}

fn passing_year(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&Scalar>,
    current_year: i32,
) -> Option<i32> {
    let year = errors.integer(field, value)?;
    errors
        .between(field, year, EARLIEST_PASSING_YEAR, i64::from(current_year))
        .then_some(year as i32)
}

fn optional_text(errors: &mut ValidationErrors, field: &str, value: Option<&str>) -> Option<String> {
    errors.max_len(field, value, TEXT_MAX);
    present(value)
}

fn required_text(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
    max: Option<usize>,
) -> Option<String> {
    let value = errors.required(field, value)?;
    if let Some(max) = max {
        errors.max_len(field, Some(&value), max);
    }
    Some(value)
}

fn required_choice<T: std::str::FromStr>(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
) -> Option<T> {
    errors.required(field, value)?;
    errors.choice(field, value)
}

impl MembershipSubmission {
    /// Validates the form and builds a pending application with its fees priced.
    pub fn validate(
        self,
        current_year: i32,
        now: DateTime<Utc>,
    ) -> Result<MembershipApplication, ServiceError> {
        let mut errors = ValidationErrors::new();

        let membership_type: Option<MembershipType> =
            required_choice(&mut errors, "membership_type", self.membership_type.as_deref());
        let full_name = required_text(&mut errors, "full_name", self.full_name.as_deref(), Some(TEXT_MAX));
        let name_bangla =
            required_text(&mut errors, "name_bangla", self.name_bangla.as_deref(), Some(TEXT_MAX));
        let father_name =
            required_text(&mut errors, "father_name", self.father_name.as_deref(), Some(TEXT_MAX));
        let mother_name = optional_text(&mut errors, "mother_name", self.mother_name.as_deref());
        let gender: Option<Gender> = required_choice(&mut errors, "gender", self.gender.as_deref());
        let jsc_year = passing_year(&mut errors, "jsc_year", self.jsc_year.as_ref(), current_year);
        let ssc_year = passing_year(&mut errors, "ssc_year", self.ssc_year.as_ref(), current_year);
        let studentship_proof_type: Option<StudentshipProofType> =
            errors.choice("studentship_proof_type", self.studentship_proof_type.as_deref());
        let highest_educational_degree = optional_text(
            &mut errors,
            "highest_educational_degree",
            self.highest_educational_degree.as_deref(),
        );
        let present_address =
            required_text(&mut errors, "present_address", self.present_address.as_deref(), None);
        let permanent_address =
            required_text(&mut errors, "permanent_address", self.permanent_address.as_deref(), None);
        let email = optional_text(&mut errors, "email", self.email.as_deref());
        errors.email("email", email.as_deref());
        let mobile_number = required_text(
            &mut errors,
            "mobile_number",
            self.mobile_number.as_deref(),
            Some(MOBILE_MAX),
        );
        let profession =
            required_text(&mut errors, "profession", self.profession.as_deref(), Some(TEXT_MAX));
        let designation = optional_text(&mut errors, "designation", self.designation.as_deref());
        let institute_name =
            optional_text(&mut errors, "institute_name", self.institute_name.as_deref());
        let t_shirt_size: Option<TShirtSize> =
            required_choice(&mut errors, "t_shirt_size", self.t_shirt_size.as_deref());
        let blood_group: Option<BloodGroup> =
            required_choice(&mut errors, "blood_group", self.blood_group.as_deref());
        let entry_fee = errors.amount("entry_fee", self.entry_fee.as_ref());
        let payment_years: Option<PaymentYears> = match self.payment_years.as_ref() {
            Some(raw) if !raw.is_blank() => errors.choice("payment_years", Some(raw.as_text().as_str())),
            _ => {
                errors.required("payment_years", None);
                None
            }
        };
        let payment_method = required_text(
            &mut errors,
            "payment_method",
            self.payment_method.as_deref(),
            Some(TEXT_MAX),
        );

        errors.finish()?;

        match (
            membership_type,
            full_name,
            name_bangla,
            father_name,
            gender,
            present_address,
            permanent_address,
            mobile_number,
            profession,
            t_shirt_size,
            blood_group,
            payment_years,
            payment_method,
        ) {
            (
                Some(membership_type),
                Some(full_name),
                Some(name_bangla),
                Some(father_name),
                Some(gender),
                Some(present_address),
                Some(permanent_address),
                Some(mobile_number),
                Some(profession),
                Some(t_shirt_size),
                Some(blood_group),
                Some(payment_years),
                Some(payment_method),
            ) => {
                let quote = fees::quote(membership_type, payment_years);
                Ok(MembershipApplication {
                    id: RecordId::default(),
                    membership_type,
                    full_name,
                    name_bangla,
                    father_name,
                    mother_name,
                    gender,
                    jsc_year,
                    ssc_year,
                    studentship_proof_type,
                    studentship_proof_file: present(self.studentship_proof_file.as_deref()),
                    highest_educational_degree,
                    present_address,
                    permanent_address,
                    email,
                    mobile_number,
                    profession,
                    designation,
                    institute_name,
                    t_shirt_size,
                    blood_group,
                    photo: present(self.photo.as_deref()),
                    signature: present(self.signature.as_deref()),
                    entry_fee,
                    yearly_fee: quote.yearly_fee,
                    payment_years,
                    total_paid_amount: quote.total_paid_amount,
                    payment_method,
                    receipt_file: present(self.receipt_file.as_deref()),
                    approval: ApprovalState::pending(),
                    created_at: now,
                    updated_at: now,
                })
            }
            _ => Err(ValidationErrors::new().into()),
        }
    }
}

/// Partial update sent by an administrator. Absent fields are left alone; an
/// empty string clears an optional field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MembershipUpdate {
    pub membership_type: Option<String>,
    pub full_name: Option<String>,
    pub name_bangla: Option<String>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub gender: Option<String>,
    pub jsc_year: Option<Scalar>,
    pub ssc_year: Option<Scalar>,
    pub studentship_proof_type: Option<String>,
    pub highest_educational_degree: Option<String>,
    pub present_address: Option<String>,
    pub permanent_address: Option<String>,
    pub email: Option<String>,
    pub mobile_number: Option<String>,
    pub profession: Option<String>,
    pub designation: Option<String>,
    pub institute_name: Option<String>,
    pub t_shirt_size: Option<String>,
    pub blood_group: Option<String>,
    pub entry_fee: Option<Scalar>,
    pub payment_years: Option<Scalar>,
}

fn sometimes_text(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
    max: Option<usize>,
) -> Option<String> {
    value.and_then(|value| required_text(errors, field, Some(value), max))
}

fn sometimes_choice<T: std::str::FromStr>(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
) -> Option<T> {
    value.and_then(|value| required_choice(errors, field, Some(value)))
}

/// `Some(None)` clears the field, `None` keeps it.
fn nullable_text(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
) -> Option<Option<String>> {
    value.map(|value| optional_text(errors, field, Some(value)))
}

fn nullable_year(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&Scalar>,
    current_year: i32,
) -> Option<Option<i32>> {
    let value = value?;
    if value.is_blank() {
        return Some(None);
    }
    passing_year(errors, field, Some(value), current_year).map(Some)
}

impl MembershipUpdate {
    /// Validates the whole update before touching `application`, then reprices
    /// the fees when the type or the years changed.
    pub fn apply(
        self,
        application: &mut MembershipApplication,
        current_year: i32,
        now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        let mut errors = ValidationErrors::new();

        let membership_type: Option<MembershipType> =
            sometimes_choice(&mut errors, "membership_type", self.membership_type.as_deref());
        let full_name =
            sometimes_text(&mut errors, "full_name", self.full_name.as_deref(), Some(TEXT_MAX));
        let name_bangla =
            sometimes_text(&mut errors, "name_bangla", self.name_bangla.as_deref(), Some(TEXT_MAX));
        let father_name =
            sometimes_text(&mut errors, "father_name", self.father_name.as_deref(), Some(TEXT_MAX));
        let mother_name = nullable_text(&mut errors, "mother_name", self.mother_name.as_deref());
        let gender: Option<Gender> = sometimes_choice(&mut errors, "gender", self.gender.as_deref());
        let jsc_year = nullable_year(&mut errors, "jsc_year", self.jsc_year.as_ref(), current_year);
        let ssc_year = nullable_year(&mut errors, "ssc_year", self.ssc_year.as_ref(), current_year);
        let studentship_proof_type = self.studentship_proof_type.as_deref().map(|raw| {
            errors.choice::<StudentshipProofType>("studentship_proof_type", Some(raw))
        });
        let highest_educational_degree = nullable_text(
            &mut errors,
            "highest_educational_degree",
            self.highest_educational_degree.as_deref(),
        );
        let present_address =
            sometimes_text(&mut errors, "present_address", self.present_address.as_deref(), None);
        let permanent_address = sometimes_text(
            &mut errors,
            "permanent_address",
            self.permanent_address.as_deref(),
            None,
        );
        let email = nullable_text(&mut errors, "email", self.email.as_deref());
        if let Some(Some(address)) = &email {
            errors.email("email", Some(address));
        }
        let mobile_number = sometimes_text(
            &mut errors,
            "mobile_number",
            self.mobile_number.as_deref(),
            Some(MOBILE_MAX),
        );
        let profession =
            sometimes_text(&mut errors, "profession", self.profession.as_deref(), Some(TEXT_MAX));
        let designation = nullable_text(&mut errors, "designation", self.designation.as_deref());
        let institute_name =
            nullable_text(&mut errors, "institute_name", self.institute_name.as_deref());
        let t_shirt_size: Option<TShirtSize> =
            sometimes_choice(&mut errors, "t_shirt_size", self.t_shirt_size.as_deref());
        let blood_group: Option<BloodGroup> =
            sometimes_choice(&mut errors, "blood_group", self.blood_group.as_deref());
        let entry_fee = self.entry_fee.as_ref().map(|raw| errors.amount("entry_fee", Some(raw)));
        let payment_years = match self.payment_years.as_ref() {
            None => None,
            Some(raw) => match errors.integer("payment_years", Some(raw)) {
                Some(years @ 1..=3) => Some(PaymentYears::Years(years as u8)),
                Some(_) => {
                    errors.invalid_choice("payment_years");
                    None
                }
                None => {
                    if raw.is_blank() {
                        errors.required("payment_years", None);
                    }
                    None
                }
            },
        };

        errors.finish()?;

        let reprice = membership_type.is_some() || payment_years.is_some();
        if let Some(value) = membership_type {
            application.membership_type = value;
        }
        if let Some(value) = full_name {
            application.full_name = value;
        }
        if let Some(value) = name_bangla {
            application.name_bangla = value;
        }
        if let Some(value) = father_name {
            application.father_name = value;
        }
        if let Some(value) = mother_name {
            application.mother_name = value;
        }
        if let Some(value) = gender {
            application.gender = value;
        }
        if let Some(value) = jsc_year {
            application.jsc_year = value;
        }
        if let Some(value) = ssc_year {
            application.ssc_year = value;
        }
        if let Some(value) = studentship_proof_type {
            application.studentship_proof_type = value;
        }
        if let Some(value) = highest_educational_degree {
            application.highest_educational_degree = value;
        }
        if let Some(value) = present_address {
            application.present_address = value;
        }
        if let Some(value) = permanent_address {
            application.permanent_address = value;
        }
        if let Some(value) = email {
            application.email = value;
        }
        if let Some(value) = mobile_number {
            application.mobile_number = value;
        }
        if let Some(value) = profession {
            application.profession = value;
        }
        if let Some(value) = designation {
            application.designation = value;
        }
        if let Some(value) = institute_name {
            application.institute_name = value;
        }
        if let Some(value) = t_shirt_size {
            application.t_shirt_size = value;
        }
        if let Some(value) = blood_group {
            application.blood_group = value;
        }
        if let Some(value) = entry_fee {
            application.entry_fee = value;
        }
        if let Some(value) = payment_years {
            application.payment_years = value;
        }

        if reprice {
            let quote = fees::quote(application.membership_type, application.payment_years);
            application.yearly_fee = quote.yearly_fee;
            application.total_paid_amount = quote.total_paid_amount;
        }
        application.updated_at = now;
        Ok(())
    }
}
