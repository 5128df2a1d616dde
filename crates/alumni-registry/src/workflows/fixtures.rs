//! Shared builders for the workflow test modules.

use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, Utc};
use serde_json::Value;

use super::approval::{
    Actor, ActorId, ApprovalStore, Caller, MemoryStore, RecordId, RecordStore, Role,
};
use super::catalog::{seed_member_types, seed_scholarships, CatalogService, MemberType, Scholarship};
use super::members::{MemberDirectory, MemberProfile, PasswordIssuer, UserAccount};
use super::membership::{fees, MembershipApplication, MembershipSubmission, MembershipType};
use super::validation::Scalar;
use crate::outbound::RecordingNotifier;

pub(crate) const FRONTEND_URL: &str = "https://portal.example.org";
pub(crate) const ADMIN_TOKEN: &str = "admin-token";

pub(crate) fn at(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

pub(crate) fn now() -> DateTime<Utc> {
    at("2026-01-26T17:56:09Z")
}

pub(crate) fn admin_actor() -> Actor {
    Actor {
        id: ActorId(1),
        role: Role::SuperAdmin,
    }
}

pub(crate) fn admin() -> Caller {
    Caller::acting_as(admin_actor())
}

pub(crate) fn member_caller(id: RecordId) -> Caller {
    Caller::acting_as(Actor {
        id: ActorId(id.0),
        role: Role::Member,
    })
}

pub(crate) fn cheap_passwords() -> PasswordIssuer {
    PasswordIssuer::with_params(8, 1, 1).expect("valid argon2 params")
}

pub(crate) fn submission() -> MembershipSubmission {
    MembershipSubmission {
        membership_type: Some("GENERAL".to_string()),
        full_name: Some("Rahim Uddin".to_string()),
        name_bangla: Some("রহিম উদ্দিন".to_string()),
        father_name: Some("Karim Uddin".to_string()),
        gender: Some("MALE".to_string()),
        ssc_year: Some(Scalar::from(2020)),
        present_address: Some("Jahapur, Murshidabad".to_string()),
        permanent_address: Some("Jahapur, Murshidabad".to_string()),
        email: Some("rahim@example.com".to_string()),
        mobile_number: Some("01711000000".to_string()),
        profession: Some("Teacher".to_string()),
        t_shirt_size: Some("L".to_string()),
        blood_group: Some("O+".to_string()),
        payment_years: Some(Scalar::from(1)),
        payment_method: Some("bKash".to_string()),
        ..MembershipSubmission::default()
    }
}

/// Pending application of the given type, passing years and email.
pub(crate) fn application(
    membership_type: MembershipType,
    ssc_year: Option<i32>,
    jsc_year: Option<i32>,
    email: Option<&str>,
) -> MembershipApplication {
    let mut application = submission().validate(2026, now()).expect("valid submission");
    let quote = fees::quote(membership_type, application.payment_years);
    application.membership_type = membership_type;
    application.yearly_fee = quote.yearly_fee;
    application.total_paid_amount = quote.total_paid_amount;
    application.ssc_year = ssc_year;
    application.jsc_year = jsc_year;
    application.email = email.map(str::to_string);
    application
}

/// In-memory member registry with the super admin stored as user 1.
pub(crate) struct Registry {
    pub applications: Arc<MemoryStore<MembershipApplication>>,
    pub users: Arc<MemoryStore<UserAccount>>,
    pub profiles: Arc<MemoryStore<MemberProfile>>,
    pub notifier: RecordingNotifier,
    pub directory: Arc<MemberDirectory>,
}

pub(crate) fn registry() -> Registry {
    let applications = Arc::new(MemoryStore::<MembershipApplication>::new());
    let users = Arc::new(MemoryStore::<UserAccount>::new());
    let profiles = Arc::new(MemoryStore::<MemberProfile>::new());
    let notifier = RecordingNotifier::default();

    users
        .insert(UserAccount {
            id: RecordId::default(),
            name: "Super Admin".to_string(),
            email: Some("admin@example.com".to_string()),
            phone: None,
            password_hash: String::new(),
            role: Role::SuperAdmin,
            primary_member_type: None,
            secondary_member_type_id: None,
            member_id: None,
            membership_expires_at: None,
            membership_renewed_at: None,
            disabled_at: None,
            created_at: now(),
        })
        .expect("admin stored");

    let application_store: Arc<dyn ApprovalStore<MembershipApplication>> = applications.clone();
    let directory = Arc::new(
        MemberDirectory::new(
            users.clone(),
            profiles.clone(),
            application_store,
            Arc::new(notifier.clone()),
            FRONTEND_URL,
        )
        .with_password_issuer(cheap_passwords()),
    );

    Registry {
        applications,
        users,
        profiles,
        notifier,
        directory,
    }
}

/// Member account stored directly, bypassing the approval flow.
pub(crate) fn member_account(
    name: &str,
    member_id: &str,
    membership_type: MembershipType,
    email: Option<&str>,
    phone: Option<&str>,
) -> UserAccount {
    UserAccount {
        id: RecordId::default(),
        name: name.to_string(),
        email: email.map(str::to_string),
        phone: phone.map(str::to_string),
        password_hash: String::new(),
        role: Role::Member,
        primary_member_type: Some(membership_type),
        secondary_member_type_id: None,
        member_id: Some(member_id.to_string()),
        membership_expires_at: None,
        membership_renewed_at: None,
        disabled_at: None,
        created_at: now(),
    }
}

/// Catalog seeded with the committee roles and the four scholarship programmes.
pub(crate) struct Catalog {
    pub member_types: Arc<MemoryStore<MemberType>>,
    pub scholarships: Arc<MemoryStore<Scholarship>>,
    pub service: Arc<CatalogService>,
}

pub(crate) fn catalog() -> Catalog {
    let member_types = Arc::new(MemoryStore::<MemberType>::new());
    let scholarships = Arc::new(MemoryStore::<Scholarship>::new());
    seed_member_types(member_types.as_ref(), now()).expect("member types seeded");
    seed_scholarships(scholarships.as_ref(), now()).expect("scholarships seeded");
    let service = Arc::new(CatalogService::new(member_types.clone(), scholarships.clone()));
    Catalog {
        member_types,
        scholarships,
        service,
    }
}

pub(crate) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
