use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::identity::{require_super_admin, Caller};
use super::status::{transition, Approvable, Decision, TransitionError};
use super::store::{ApprovalStore, Record, RecordId, RepositoryError};
use crate::workflows::error::ServiceError;

/// Generic approve/reject path shared by the four record families.
pub struct ApprovalWorkflow<T> {
    store: Arc<dyn ApprovalStore<T>>,
}

impl<T> Clone for ApprovalWorkflow<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<T> ApprovalWorkflow<T>
where
    T: Record + Approvable,
{
    pub fn new(store: Arc<dyn ApprovalStore<T>>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ApprovalStore<T>> {
        &self.store
    }

    /// Loads a record for a super admin, answering 404 when it is missing.
    pub fn load(&self, id: RecordId, caller: &Caller) -> Result<T, ServiceError> {
        require_super_admin(caller)?;
        self.fetch(id)
    }

    pub fn fetch(&self, id: RecordId) -> Result<T, ServiceError> {
        self.store
            .fetch(id)?
            .ok_or(ServiceError::NotFound(T::KIND.not_found_message()))
    }

    /// Authorizes, checks the record is pending, runs `precheck`, then commits
    /// the transition. Nothing is written unless every step passes.
    pub fn decide<F>(
        &self,
        id: RecordId,
        caller: &Caller,
        decision: Decision,
        at: DateTime<Utc>,
        precheck: F,
    ) -> Result<T, ServiceError>
    where
        F: FnOnce(&T) -> Result<(), ServiceError>,
    {
        let actor = require_super_admin(caller)?;
        let mut record = self.fetch(id)?;

        let status = record.approval().status;
        if status.is_decided() {
            return Err(TransitionError::NotPending {
                kind: T::KIND,
                status,
            }
            .into());
        }
        precheck(&record)?;

        transition(&mut record, &decision, &actor.id, at)?;
        self.store
            .commit_decision(record.clone())
            .map_err(|err| match err {
                RepositoryError::StaleDecision(status) => {
                    ServiceError::from(TransitionError::NotPending {
                        kind: T::KIND,
                        status,
                    })
                }
                other => ServiceError::from(other),
            })?;

        info!(
            kind = T::KIND.label(),
            id = %id,
            actor = %actor.id,
            status = record.approval().status.label(),
            "approval decision recorded"
        );
        Ok(record)
    }
}
