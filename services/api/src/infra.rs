use alumni_registry::config::AdminConfig;
use alumni_registry::error::AppError;
use alumni_registry::outbound::{DocumentStore, Notifier};
use alumni_registry::workflows::approval::{
    ApprovalStore, MemoryStore, RecordId, RecordStore, Role, StaticTokenIdentity,
};
use alumni_registry::workflows::catalog::{
    seed_member_types, seed_scholarships, CatalogService, MemberType, Scholarship,
};
use alumni_registry::workflows::declarations::{DeclarationService, SelfDeclaration};
use alumni_registry::workflows::members::{
    MemberDirectory, MemberProfile, PasswordIssuer, UserAccount,
};
use alumni_registry::workflows::membership::{MembershipApplication, MembershipService};
use alumni_registry::workflows::payments::{Payment, PaymentService};
use alumni_registry::workflows::scholarships::{ScholarshipApplication, ScholarshipService};
use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Outbound adapters and settings a registry is built from.
pub(crate) struct RegistryOptions {
    pub(crate) frontend_url: String,
    pub(crate) documents: Arc<dyn DocumentStore>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) passwords: Option<PasswordIssuer>,
}

/// Rows loaded from an export when a maintenance command runs offline.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Snapshot {
    #[serde(default)]
    pub(crate) users: Vec<UserAccount>,
    #[serde(default)]
    pub(crate) profiles: Vec<MemberProfile>,
    #[serde(default)]
    pub(crate) applications: Vec<MembershipApplication>,
}

impl Snapshot {
    pub(crate) fn from_path(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read(path)?;
        Ok(serde_json::from_slice(&raw)?)
    }
}

/// Every service of the registry, wired to in-process stores.
pub(crate) struct Registry {
    pub(crate) identity: Arc<StaticTokenIdentity>,
    pub(crate) documents: Arc<dyn DocumentStore>,
    pub(crate) users: Arc<MemoryStore<UserAccount>>,
    pub(crate) profiles: Arc<MemoryStore<MemberProfile>>,
    pub(crate) catalog: Arc<CatalogService>,
    pub(crate) members: Arc<MemberDirectory>,
    pub(crate) membership: Arc<MembershipService>,
    pub(crate) payments: Arc<PaymentService>,
    pub(crate) scholarships: Arc<ScholarshipService>,
    pub(crate) declarations: Arc<DeclarationService>,
}

pub(crate) fn build_registry(
    options: RegistryOptions,
    snapshot: Snapshot,
    now: DateTime<Utc>,
) -> Result<Registry, AppError> {
    let RegistryOptions {
        frontend_url,
        documents,
        notifier,
        passwords,
    } = options;

    let users = Arc::new(MemoryStore::from_records(snapshot.users));
    let profiles = Arc::new(MemoryStore::from_records(snapshot.profiles));
    let applications = Arc::new(MemoryStore::from_records(snapshot.applications));
    let member_types = Arc::new(MemoryStore::<MemberType>::new());
    let scholarship_programmes = Arc::new(MemoryStore::<Scholarship>::new());

    let seeded_types = seed_member_types(member_types.as_ref(), now)?;
    let seeded_scholarships = seed_scholarships(scholarship_programmes.as_ref(), now)?;
    info!(
        member_types = seeded_types,
        scholarships = seeded_scholarships,
        "reference data seeded"
    );

    let catalog = Arc::new(CatalogService::new(member_types, scholarship_programmes));
    let application_store: Arc<dyn ApprovalStore<MembershipApplication>> = applications;
    let mut directory = MemberDirectory::new(
        users.clone(),
        profiles.clone(),
        application_store.clone(),
        notifier.clone(),
        frontend_url,
    );
    if let Some(passwords) = passwords {
        directory = directory.with_password_issuer(passwords);
    }
    let members = Arc::new(directory);

    let membership = Arc::new(MembershipService::new(application_store, members.clone()));
    let payments = Arc::new(PaymentService::new(
        Arc::new(MemoryStore::<Payment>::new()),
        members.clone(),
        documents.clone(),
        notifier,
    ));
    let scholarships = Arc::new(ScholarshipService::new(
        Arc::new(MemoryStore::<ScholarshipApplication>::new()),
        catalog.clone(),
    ));
    let declarations = Arc::new(DeclarationService::new(
        Arc::new(MemoryStore::<SelfDeclaration>::new()),
        members.clone(),
        catalog.clone(),
    ));

    Ok(Registry {
        identity: Arc::new(StaticTokenIdentity::new()),
        documents,
        users,
        profiles,
        catalog,
        members,
        membership,
        payments,
        scholarships,
        declarations,
    })
}

/// Stores the configured super admin and binds the admin token to it.
pub(crate) fn seed_admin(
    registry: &Registry,
    admin: &AdminConfig,
    now: DateTime<Utc>,
) -> Result<UserAccount, AppError> {
    let account = registry.users.insert(UserAccount {
        id: RecordId::default(),
        name: admin.name.clone(),
        email: Some(admin.email.clone()),
        phone: None,
        password_hash: String::new(),
        role: Role::SuperAdmin,
        primary_member_type: None,
        secondary_member_type_id: None,
        member_id: None,
        membership_expires_at: None,
        membership_renewed_at: None,
        disabled_at: None,
        created_at: now,
    })?;
    if let Some(token) = &admin.token {
        registry.identity.register(token.clone(), account.actor());
        info!(user_id = %account.id, "super admin token registered");
    }
    Ok(account)
}
