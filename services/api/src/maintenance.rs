use crate::infra::{build_registry, Registry, RegistryOptions, Snapshot};
use alumni_registry::config::AppConfig;
use alumni_registry::error::AppError;
use alumni_registry::outbound::{MemoryDocumentStore, TracingNotifier};
use alumni_registry::workflows::approval::{RecordId, RecordStore};
use alumni_registry::workflows::members::MemberProfile;
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct SnapshotArgs {
    /// JSON export with `users`, `profiles` and `applications` arrays
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Write the changed rows as JSON instead of only printing the summary
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ExpiryChange {
    user_id: RecordId,
    member_id: Option<String>,
    membership_expires_at: Option<DateTime<Utc>>,
}

fn offline_registry(snapshot: Snapshot) -> Result<Registry, AppError> {
    let config = AppConfig::load()?;
    build_registry(
        RegistryOptions {
            frontend_url: config.portal.frontend_url,
            documents: Arc::new(MemoryDocumentStore::default()),
            notifier: Arc::new(TracingNotifier),
            passwords: None,
        },
        snapshot,
        Utc::now(),
    )
}

fn write_output<T: Serialize>(path: Option<PathBuf>, rows: &[T]) -> Result<(), AppError> {
    let Some(path) = path else {
        return Ok(());
    };
    let json = serde_json::to_vec_pretty(rows)?;
    std::fs::write(&path, json)?;
    println!("Wrote {} row(s) to {}", rows.len(), path.display());
    Ok(())
}

pub(crate) fn run_backfill_expiry(args: SnapshotArgs) -> Result<(), AppError> {
    let snapshot = Snapshot::from_path(&args.snapshot)?;
    let missing: HashSet<RecordId> = snapshot
        .users
        .iter()
        .filter(|user| user.membership_expires_at.is_none())
        .map(|user| user.id)
        .collect();

    let registry = offline_registry(snapshot)?;
    let report = registry.members.backfill_expiry()?;
    println!("{}", report.summary());

    let changes: Vec<ExpiryChange> = registry
        .users
        .select(&|user| missing.contains(&user.id) && user.membership_expires_at.is_some())?
        .into_iter()
        .map(|user| ExpiryChange {
            user_id: user.id,
            member_id: user.member_id,
            membership_expires_at: user.membership_expires_at,
        })
        .collect();
    for change in &changes {
        println!(
            "  - {} -> {}",
            change.member_id.as_deref().unwrap_or("(no member id)"),
            change
                .membership_expires_at
                .map(|at| at.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        );
    }
    write_output(args.output, &changes)
}

pub(crate) fn run_migrate_profiles(args: SnapshotArgs) -> Result<(), AppError> {
    let snapshot = Snapshot::from_path(&args.snapshot)?;
    let existing: HashSet<RecordId> = snapshot.profiles.iter().map(|profile| profile.id).collect();

    let registry = offline_registry(snapshot)?;
    let report = registry.members.backfill_profiles(Utc::now())?;
    println!("{}", report.summary());

    let created: Vec<MemberProfile> = registry
        .profiles
        .select(&|profile| !existing.contains(&profile.id))?;
    write_output(args.output, &created)
}
