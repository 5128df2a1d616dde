use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::{Approvable, ApprovalStatus};

/// Row identifier assigned by a store on insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Anything kept in a [`RecordStore`].
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> RecordId;
    fn assign_id(&mut self, id: RecordId);
    fn created_at(&self) -> DateTime<Utc>;

    /// Value that must be unique across the store, when the record has one.
    fn unique_key(&self) -> Option<String> {
        None
    }
}

/// Storage abstraction so services can be exercised in isolation.
pub trait RecordStore<T: Record>: Send + Sync {
    fn insert(&self, record: T) -> Result<T, RepositoryError>;
    fn update(&self, record: T) -> Result<(), RepositoryError>;
    fn fetch(&self, id: RecordId) -> Result<Option<T>, RepositoryError>;
    /// Records accepted by `filter`, newest first.
    fn select(&self, filter: &dyn Fn(&T) -> bool) -> Result<Vec<T>, RepositoryError>;
}

/// Store that can persist a decision only while the stored row is still pending.
pub trait ApprovalStore<T: Record + Approvable>: RecordStore<T> {
    fn commit_decision(&self, record: T) -> Result<(), RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("stored record is already {}", .0.label())]
    StaleDecision(ApprovalStatus),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

struct Table<T> {
    next_id: u64,
    rows: BTreeMap<RecordId, T>,
}

/// Mutex-guarded in-process table. Every read and write holds the lock, so a
/// conditional commit cannot interleave with another writer.
pub struct MemoryStore<T> {
    table: Mutex<Table<T>>,
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self {
            table: Mutex::new(Table {
                next_id: 0,
                rows: BTreeMap::new(),
            }),
        }
    }
}

impl<T: Record> MemoryStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding previously persisted rows under their own ids.
    pub fn from_records(records: impl IntoIterator<Item = T>) -> Self {
        let rows: BTreeMap<RecordId, T> = records
            .into_iter()
            .map(|record| (record.id(), record))
            .collect();
        let next_id = rows.keys().next_back().map_or(0, |id| id.0);
        Self {
            table: Mutex::new(Table { next_id, rows }),
        }
    }

    pub fn len(&self) -> usize {
        self.table.lock().expect("store mutex poisoned").rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn key_taken<T: Record>(rows: &BTreeMap<RecordId, T>, record: &T) -> bool {
    match record.unique_key() {
        Some(key) => rows
            .values()
            .any(|row| row.id() != record.id() && row.unique_key().as_deref() == Some(&key)),
        None => false,
    }
}

impl<T: Record> RecordStore<T> for MemoryStore<T> {
    fn insert(&self, mut record: T) -> Result<T, RepositoryError> {
        let mut table = self.table.lock().expect("store mutex poisoned");
        let id = RecordId(table.next_id + 1);
        record.assign_id(id);
        if key_taken(&table.rows, &record) {
            return Err(RepositoryError::Conflict);
        }
        table.next_id = id.0;
        table.rows.insert(id, record.clone());
        Ok(record)
    }

    fn update(&self, record: T) -> Result<(), RepositoryError> {
        let mut table = self.table.lock().expect("store mutex poisoned");
        if !table.rows.contains_key(&record.id()) {
            return Err(RepositoryError::NotFound);
        }
        if key_taken(&table.rows, &record) {
            return Err(RepositoryError::Conflict);
        }
        table.rows.insert(record.id(), record);
        Ok(())
    }

    fn fetch(&self, id: RecordId) -> Result<Option<T>, RepositoryError> {
        let table = self.table.lock().expect("store mutex poisoned");
        Ok(table.rows.get(&id).cloned())
    }

    fn select(&self, filter: &dyn Fn(&T) -> bool) -> Result<Vec<T>, RepositoryError> {
        let table = self.table.lock().expect("store mutex poisoned");
        let mut rows: Vec<T> = table
            .rows
            .values()
            .rev()
            .filter(|row| filter(row))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(rows)
    }
}

impl<T: Record + Approvable> ApprovalStore<T> for MemoryStore<T> {
    fn commit_decision(&self, record: T) -> Result<(), RepositoryError> {
        let mut table = self.table.lock().expect("store mutex poisoned");
        let stored = table
            .rows
            .get(&record.id())
            .ok_or(RepositoryError::NotFound)?;
        let status = stored.approval().status;
        if status != ApprovalStatus::Pending {
            return Err(RepositoryError::StaleDecision(status));
        }
        table.rows.insert(record.id(), record);
        Ok(())
    }
}
