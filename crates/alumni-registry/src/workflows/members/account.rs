use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::approval::{Actor, ActorId, Record, RecordId, Role};
use crate::workflows::membership::{
    BloodGroup, Gender, MembershipApplication, MembershipType, TShirtSize,
};

/// Login account. Members get one when their application is approved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: RecordId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default, skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub primary_member_type: Option<MembershipType>,
    pub secondary_member_type_id: Option<RecordId>,
    pub member_id: Option<String>,
    pub membership_expires_at: Option<DateTime<Utc>>,
    pub membership_renewed_at: Option<DateTime<Utc>>,
    pub disabled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn actor(&self) -> Actor {
        Actor {
            id: ActorId(self.id.0),
            role: self.role,
        }
    }

    pub fn is_member(&self) -> bool {
        self.role == Role::Member
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled_at.is_some()
    }

    pub fn is_lifetime(&self) -> bool {
        self.primary_member_type == Some(MembershipType::Lifetime)
    }
}

impl Record for UserAccount {
    fn id(&self) -> RecordId {
        self.id
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn unique_key(&self) -> Option<String> {
        self.member_id.clone()
    }
}

/// Personal details carried over from the approved application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberProfile {
    pub id: RecordId,
    pub user_id: RecordId,
    pub name_bangla: Option<String>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub gender: Option<Gender>,
    pub jsc_year: Option<i32>,
    pub ssc_year: Option<i32>,
    pub highest_educational_degree: Option<String>,
    pub present_address: Option<String>,
    pub permanent_address: Option<String>,
    pub profession: Option<String>,
    pub designation: Option<String>,
    pub institute_name: Option<String>,
    pub t_shirt_size: Option<TShirtSize>,
    pub blood_group: Option<BloodGroup>,
    pub photo: Option<String>,
    pub signature: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MemberProfile {
    pub fn from_application(
        user_id: RecordId,
        application: &MembershipApplication,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RecordId::default(),
            user_id,
            name_bangla: Some(application.name_bangla.clone()),
            father_name: Some(application.father_name.clone()),
            mother_name: application.mother_name.clone(),
            gender: Some(application.gender),
            jsc_year: application.jsc_year,
            ssc_year: application.ssc_year,
            highest_educational_degree: application.highest_educational_degree.clone(),
            present_address: Some(application.present_address.clone()),
            permanent_address: Some(application.permanent_address.clone()),
            profession: Some(application.profession.clone()),
            designation: application.designation.clone(),
            institute_name: application.institute_name.clone(),
            t_shirt_size: Some(application.t_shirt_size),
            blood_group: Some(application.blood_group),
            photo: application.photo.clone(),
            signature: application.signature.clone(),
            created_at: now,
        }
    }
}

impl Record for MemberProfile {
    fn id(&self) -> RecordId {
        self.id
    }

    fn assign_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.user_id.to_string())
    }
}

/// Member as returned by the admin endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberView {
    #[serde(flatten)]
    pub account: UserAccount,
    /// Stored expiry, or the one derived from the approved application.
    pub effective_membership_expires_at: Option<DateTime<Utc>>,
    pub profile: Option<MemberProfile>,
}

/// Public lookup used to pre-fill payment forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberInfo {
    pub member_id: String,
    pub name: String,
    pub address: String,
    pub mobile_number: String,
}

/// Short account summary returned after an approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSummary {
    pub id: RecordId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub member_id: Option<String>,
}

impl From<&UserAccount> for AccountSummary {
    fn from(account: &UserAccount) -> Self {
        Self {
            id: account.id,
            name: account.name.clone(),
            email: account.email.clone(),
            phone: account.phone.clone(),
            member_id: account.member_id.clone(),
        }
    }
}
