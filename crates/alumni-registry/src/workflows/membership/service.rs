use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use tracing::info;

use super::domain::MembershipApplication;
use super::intake::{MembershipSubmission, MembershipUpdate};
use crate::workflows::approval::{
    require_super_admin, ApprovalStore, ApprovalWorkflow, Caller, Decision, ListQuery, Page,
    RecordId, SideEffect,
};
use crate::workflows::error::ServiceError;
use crate::workflows::members::{AccountSummary, MemberDirectory, MemberIdError};

/// Application after approval together with the account created for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovedMembership {
    pub application: MembershipApplication,
    pub user: AccountSummary,
    pub effect: SideEffect,
}

pub struct MembershipService {
    workflow: ApprovalWorkflow<MembershipApplication>,
    members: Arc<MemberDirectory>,
}

impl MembershipService {
    pub fn new(
        store: Arc<dyn ApprovalStore<MembershipApplication>>,
        members: Arc<MemberDirectory>,
    ) -> Self {
        Self {
            workflow: ApprovalWorkflow::new(store),
            members,
        }
    }

    /// Public intake. The application starts pending with its fees priced.
    pub fn submit(
        &self,
        submission: MembershipSubmission,
        now: DateTime<Utc>,
    ) -> Result<MembershipApplication, ServiceError> {
        let application = submission.validate(now.year(), now)?;
        let stored = self.workflow.store().insert(application)?;
        info!(id = %stored.id, membership_type = stored.membership_type.as_str(), "membership application submitted");
        Ok(stored)
    }

    pub fn list(
        &self,
        caller: &Caller,
        query: &ListQuery,
    ) -> Result<Page<MembershipApplication>, ServiceError> {
        require_super_admin(caller)?;
        let rows = self
            .workflow
            .store()
            .select(&|application| query.admits(application.approval.status))?;
        Ok(query.paginate(rows))
    }

    pub fn show(
        &self,
        caller: &Caller,
        id: RecordId,
    ) -> Result<MembershipApplication, ServiceError> {
        self.workflow.load(id, caller)
    }

    pub fn update(
        &self,
        caller: &Caller,
        id: RecordId,
        update: MembershipUpdate,
        now: DateTime<Utc>,
    ) -> Result<MembershipApplication, ServiceError> {
        let mut application = self.workflow.load(id, caller)?;
        update.apply(&mut application, now.year(), now)?;
        self.workflow.store().update(application.clone())?;
        info!(id = %id, "membership application updated");
        Ok(application)
    }

    /// Approves the application, then creates the member account. An account
    /// failure is reported but the approval stays committed.
    pub fn approve(
        &self,
        caller: &Caller,
        id: RecordId,
        now: DateTime<Utc>,
    ) -> Result<ApprovedMembership, ServiceError> {
        let application = self
            .workflow
            .decide(id, caller, Decision::Approve, now, |application| {
                match application.passing_year() {
                    Some(_) => Ok(()),
                    None => Err(ServiceError::rule(MemberIdError::MissingYear.to_string())),
                }
            })?;

        let provisioned = self.members.provision(&application, now)?;
        Ok(ApprovedMembership {
            user: provisioned.summary(),
            effect: provisioned.effect,
            application,
        })
    }

    pub fn reject(
        &self,
        caller: &Caller,
        id: RecordId,
        now: DateTime<Utc>,
    ) -> Result<MembershipApplication, ServiceError> {
        self.workflow
            .decide(id, caller, Decision::Reject { reason: None }, now, |_| Ok(()))
    }
}
