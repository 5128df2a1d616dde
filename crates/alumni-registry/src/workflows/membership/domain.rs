use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::workflows::approval::{
    Approvable, ApprovableKind, ApprovalState, Record, RecordId,
};
use crate::workflows::validation::Scalar;

/// Returned by the `FromStr` impls when a value is outside an enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value '{0}'")]
pub struct UnknownValue(pub String);

/// Primary membership tier chosen on the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipType {
    General,
    Lifetime,
    Associate,
}

impl MembershipType {
    pub const ALL: [Self; 3] = [Self::General, Self::Lifetime, Self::Associate];

    pub const fn as_str(self) -> &'static str {
        match self {
            MembershipType::General => "GENERAL",
            MembershipType::Lifetime => "LIFETIME",
            MembershipType::Associate => "ASSOCIATE",
        }
    }

    pub const fn member_id_prefix(self) -> &'static str {
        match self {
            MembershipType::General => "G",
            MembershipType::Lifetime => "LT",
            MembershipType::Associate => "A",
        }
    }

    pub const fn expires(self) -> bool {
        !matches!(self, MembershipType::Lifetime)
    }
}

impl FromStr for MembershipType {
    type Err = UnknownValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == value)
            .ok_or_else(|| UnknownValue(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Self; 3] = [Self::Male, Self::Female, Self::Other];

    pub const fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
            Gender::Other => "OTHER",
        }
    }
}

impl FromStr for Gender {
    type Err = UnknownValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == value)
            .ok_or_else(|| UnknownValue(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodGroup {
    pub const ALL: [Self; 8] = [
        Self::APositive,
        Self::ANegative,
        Self::BPositive,
        Self::BNegative,
        Self::AbPositive,
        Self::AbNegative,
        Self::OPositive,
        Self::ONegative,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            BloodGroup::APositive => "A+",
            BloodGroup::ANegative => "A-",
            BloodGroup::BPositive => "B+",
            BloodGroup::BNegative => "B-",
            BloodGroup::AbPositive => "AB+",
            BloodGroup::AbNegative => "AB-",
            BloodGroup::OPositive => "O+",
            BloodGroup::ONegative => "O-",
        }
    }
}

impl FromStr for BloodGroup {
    type Err = UnknownValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == value)
            .ok_or_else(|| UnknownValue(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TShirtSize {
    #[serde(rename = "XXXL")]
    Xxxl,
    #[serde(rename = "XXL")]
    Xxl,
    #[serde(rename = "XL")]
    Xl,
    #[serde(rename = "L")]
    L,
    #[serde(rename = "M")]
    M,
    #[serde(rename = "S")]
    S,
}

impl TShirtSize {
    pub const ALL: [Self; 6] = [Self::Xxxl, Self::Xxl, Self::Xl, Self::L, Self::M, Self::S];

    pub const fn as_str(self) -> &'static str {
        match self {
            TShirtSize::Xxxl => "XXXL",
            TShirtSize::Xxl => "XXL",
            TShirtSize::Xl => "XL",
            TShirtSize::L => "L",
            TShirtSize::M => "M",
            TShirtSize::S => "S",
        }
    }
}

impl FromStr for TShirtSize {
    type Err = UnknownValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == value)
            .ok_or_else(|| UnknownValue(value.to_string()))
    }
}

/// Document offered as proof of having studied at the school.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StudentshipProofType {
    Jsc,
    Eight,
    Ssc,
    MetricCertificate,
    MarkSheet,
    Others,
}

impl StudentshipProofType {
    pub const ALL: [Self; 6] = [
        Self::Jsc,
        Self::Eight,
        Self::Ssc,
        Self::MetricCertificate,
        Self::MarkSheet,
        Self::Others,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            StudentshipProofType::Jsc => "JSC",
            StudentshipProofType::Eight => "EIGHT",
            StudentshipProofType::Ssc => "SSC",
            StudentshipProofType::MetricCertificate => "METRIC_CERTIFICATE",
            StudentshipProofType::MarkSheet => "MARK_SHEET",
            StudentshipProofType::Others => "OTHERS",
        }
    }
}

impl FromStr for StudentshipProofType {
    type Err = UnknownValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == value)
            .ok_or_else(|| UnknownValue(value.to_string()))
    }
}

/// Contracted membership duration: a number of years, or a one-off lifetime payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentYears {
    Years(u8),
    Lifetime,
}

impl PaymentYears {
    /// Years to add to the approval time, if the membership expires at all.
    pub const fn years(self) -> Option<u32> {
        match self {
            PaymentYears::Years(years) => Some(years as u32),
            PaymentYears::Lifetime => None,
        }
    }
}

impl fmt::Display for PaymentYears {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentYears::Years(years) => write!(f, "{years}"),
            PaymentYears::Lifetime => write!(f, "lifetime"),
        }
    }
}

impl FromStr for PaymentYears {
    type Err = UnknownValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("lifetime") {
            return Ok(PaymentYears::Lifetime);
        }
        match trimmed.parse::<u8>() {
            Ok(years) if years >= 1 => Ok(PaymentYears::Years(years)),
            _ => Err(UnknownValue(value.to_string())),
        }
    }
}

impl Serialize for PaymentYears {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PaymentYears::Years(years) => serializer.serialize_u8(*years),
            PaymentYears::Lifetime => serializer.serialize_str("lifetime"),
        }
    }
}

impl<'de> Deserialize<'de> for PaymentYears {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Scalar::deserialize(deserializer)?;
        raw.as_text().parse().map_err(serde::de::Error::custom)
    }
}

/// A membership application as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipApplication {
    pub id: RecordId,
    pub membership_type: MembershipType,
    pub full_name: String,
    pub name_bangla: String,
    pub father_name: String,
    pub mother_name: Option<String>,
    pub gender: Gender,
    pub jsc_year: Option<i32>,
    pub ssc_year: Option<i32>,
    pub studentship_proof_type: Option<StudentshipProofType>,
    pub studentship_proof_file: Option<String>,
    pub highest_educational_degree: Option<String>,
    pub present_address: String,
    pub permanent_address: String,
    pub email: Option<String>,
    pub mobile_number: String,
    pub profession: String,
    pub designation: Option<String>,
    pub institute_name: Option<String>,
    pub t_shirt_size: TShirtSize,
    pub blood_group: BloodGroup,
    pub photo: Option<String>,
    pub signature: Option<String>,
    pub entry_fee: Option<Decimal>,
    pub yearly_fee: Decimal,
    pub payment_years: PaymentYears,
    pub total_paid_amount: Decimal,
    pub payment_method: String,
    pub receipt_file: Option<String>,
    #[serde(flatten)]
    pub approval: ApprovalState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MembershipApplication {
    /// Passing year used in the member ID: SSC when known, JSC otherwise.
    pub fn passing_year(&self) -> Option<i32> {
        self.ssc_year.or(self.jsc_year)
    }
}

impl Record for MembershipApplication {
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

impl Approvable for MembershipApplication {
    const KIND: ApprovableKind = ApprovableKind::MembershipApplication;
    const RECORDS_REJECTION_REASON: bool = false;

    fn approval(&self) -> &ApprovalState {
        &self.approval
    }

    fn approval_mut(&mut self) -> &mut ApprovalState {
        &mut self.approval
    }
}
