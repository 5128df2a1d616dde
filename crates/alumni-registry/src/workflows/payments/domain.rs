use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::workflows::approval::{
    Approvable, ApprovableKind, ApprovalState, Record, RecordId,
};
use crate::workflows::membership::UnknownValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentPurpose {
    AssociateMembershipFees,
    GeneralMembershipFees,
    LifetimeMembershipFees,
    SpecialYearlyContributionExecutive,
    YearlySubscriptionAssociateMember,
    YearlySubscriptionGeneralMember,
    YearlySubscriptionLifetimeMember,
    Donations,
    Patron,
    Others,
}

impl PaymentPurpose {
    pub const ALL: [Self; 10] = [
        Self::AssociateMembershipFees,
        Self::GeneralMembershipFees,
        Self::LifetimeMembershipFees,
        Self::SpecialYearlyContributionExecutive,
        Self::YearlySubscriptionAssociateMember,
        Self::YearlySubscriptionGeneralMember,
        Self::YearlySubscriptionLifetimeMember,
        Self::Donations,
        Self::Patron,
        Self::Others,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            PaymentPurpose::AssociateMembershipFees => "ASSOCIATE_MEMBERSHIP_FEES",
            PaymentPurpose::GeneralMembershipFees => "GENERAL_MEMBERSHIP_FEES",
            PaymentPurpose::LifetimeMembershipFees => "LIFETIME_MEMBERSHIP_FEES",
            PaymentPurpose::SpecialYearlyContributionExecutive => {
                "SPECIAL_YEARLY_CONTRIBUTION_EXECUTIVE"
            }
            PaymentPurpose::YearlySubscriptionAssociateMember => {
                "YEARLY_SUBSCRIPTION_ASSOCIATE_MEMBER"
            }
            PaymentPurpose::YearlySubscriptionGeneralMember => "YEARLY_SUBSCRIPTION_GENERAL_MEMBER",
            PaymentPurpose::YearlySubscriptionLifetimeMember => {
                "YEARLY_SUBSCRIPTION_LIFETIME_MEMBER"
            }
            PaymentPurpose::Donations => "DONATIONS",
            PaymentPurpose::Patron => "PATRON",
            PaymentPurpose::Others => "OTHERS",
        }
    }

    /// Wording printed on the money receipt.
    pub const fn label(self) -> &'static str {
        match self {
            PaymentPurpose::AssociateMembershipFees => "Associate Membership Fees",
            PaymentPurpose::GeneralMembershipFees => "General Membership Fees",
            PaymentPurpose::LifetimeMembershipFees => "Lifetime Membership Fees",
            PaymentPurpose::SpecialYearlyContributionExecutive => {
                "Special Yearly Contribution (Executive)"
            }
            PaymentPurpose::YearlySubscriptionAssociateMember => {
                "Yearly Subscription (Associate Member)"
            }
            PaymentPurpose::YearlySubscriptionGeneralMember => "Yearly Subscription (General Member)",
            PaymentPurpose::YearlySubscriptionLifetimeMember => {
                "Yearly Subscription (Lifetime Member)"
            }
            PaymentPurpose::Donations => "Donations",
            PaymentPurpose::Patron => "Patron",
            PaymentPurpose::Others => "Others",
        }
    }
}

impl FromStr for PaymentPurpose {
    type Err = UnknownValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == value)
            .ok_or_else(|| UnknownValue(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: RecordId,
    pub member_id: Option<String>,
    pub name: String,
    pub address: String,
    pub mobile_number: String,
    pub payment_purpose: PaymentPurpose,
    pub payment_method: Option<String>,
    pub payment_amount: Decimal,
    pub payment_proof_file: String,
    pub receipt_file: Option<String>,
    #[serde(flatten)]
    pub approval: ApprovalState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Payment {
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

impl Approvable for Payment {
    const KIND: ApprovableKind = ApprovableKind::Payment;
    const RECORDS_REJECTION_REASON: bool = false;

    fn approval(&self) -> &ApprovalState {
        &self.approval
    }

    fn approval_mut(&mut self) -> &mut ApprovalState {
        &mut self.approval
    }
}
