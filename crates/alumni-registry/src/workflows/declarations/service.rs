use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::domain::{SelfDeclaration, SelfDeclarationView};
use super::intake::DeclarationSubmission;
use crate::workflows::approval::{
    require_authenticated, require_super_admin, ApprovalStore, ApprovalWorkflow,
    Caller, Decision, ListQuery, Page, RecordId, RejectRequest, SideEffect,
};
use crate::workflows::catalog::CatalogService;
use crate::workflows::error::ServiceError;
use crate::workflows::members::{AccountSummary, MemberDirectory, MEMBER_NOT_FOUND};

pub const ALREADY_ASSIGNED: &str = "You already have a secondary member type assigned.";
pub const ALREADY_PENDING: &str = "You already have a pending self-declaration.";

#[derive(Debug, Clone, PartialEq)]
pub struct ApprovedDeclaration {
    pub declaration: SelfDeclarationView,
    pub effect: SideEffect,
}

pub struct DeclarationService {
    workflow: ApprovalWorkflow<SelfDeclaration>,
    members: Arc<MemberDirectory>,
    catalog: Arc<CatalogService>,
}

impl DeclarationService {
    pub fn new(
        store: Arc<dyn ApprovalStore<SelfDeclaration>>,
        members: Arc<MemberDirectory>,
        catalog: Arc<CatalogService>,
    ) -> Self {
        Self {
            workflow: ApprovalWorkflow::new(store),
            members,
            catalog,
        }
    }

    fn view(&self, declaration: SelfDeclaration) -> Result<SelfDeclarationView, ServiceError> {
        let user = self
            .members
            .account(declaration.user_id)?
            .map(|account| AccountSummary::from(&account));
        let secondary_member_type = self
            .catalog
            .member_type(declaration.secondary_member_type_id)?;
        Ok(SelfDeclarationView {
            declaration,
            user,
            secondary_member_type,
        })
    }

    /// Signed-in members only. An account holds at most one committee role
    /// and one pending declaration.
    pub fn submit(
        &self,
        caller: &Caller,
        submission: DeclarationSubmission,
        now: DateTime<Utc>,
    ) -> Result<SelfDeclarationView, ServiceError> {
        let actor = require_authenticated(caller)?;
        let account = self
            .members
            .account_for(actor)?
            .ok_or(ServiceError::Unauthenticated)?;
        if account.secondary_member_type_id.is_some() {
            return Err(ServiceError::rule(ALREADY_ASSIGNED));
        }
        if !self.pending_for(account.id)?.is_empty() {
            return Err(ServiceError::rule(ALREADY_PENDING));
        }

        let member_type_known = match submission.secondary_member_type_id() {
            Some(id) => self.catalog.member_type(id)?.is_some(),
            None => false,
        };
        let declaration = submission.validate(account.id, member_type_known, now)?;
        let stored = self.workflow.store().insert(declaration)?;
        info!(id = %stored.id, user_id = %stored.user_id, "self-declaration submitted");
        self.view(stored)
    }

    pub fn list(
        &self,
        caller: &Caller,
        query: &ListQuery,
    ) -> Result<Page<SelfDeclarationView>, ServiceError> {
        require_super_admin(caller)?;
        let rows = self
            .workflow
            .store()
            .select(&|declaration| query.admits(declaration.approval.status))?;
        let page = query.paginate(rows);
        let mut views = Vec::with_capacity(page.data.len());
        for declaration in page.data {
            views.push(self.view(declaration)?);
        }
        Ok(Page {
            data: views,
            meta: page.meta,
        })
    }

    pub fn show(&self, caller: &Caller, id: RecordId) -> Result<SelfDeclarationView, ServiceError> {
        let declaration = self.workflow.load(id, caller)?;
        self.view(declaration)
    }

    /// Approves and copies the declared committee role onto the member's account.
    pub fn approve(
        &self,
        caller: &Caller,
        id: RecordId,
        now: DateTime<Utc>,
    ) -> Result<ApprovedDeclaration, ServiceError> {
        let declaration = self.workflow.decide(id, caller, Decision::Approve, now, |declaration| {
            match self.members.account(declaration.user_id)? {
                Some(_) => Ok(()),
                None => Err(ServiceError::NotFound(MEMBER_NOT_FOUND)),
            }
        })?;

        let mut account = self
            .members
            .account(declaration.user_id)?
            .ok_or(ServiceError::NotFound(MEMBER_NOT_FOUND))?;
        account.secondary_member_type_id = Some(declaration.secondary_member_type_id);
        self.members.save(account)?;
        info!(
            id = %id,
            user_id = %declaration.user_id,
            secondary_member_type_id = %declaration.secondary_member_type_id,
            "secondary member type assigned"
        );

        let effect = SideEffect::SecondaryTypeAssigned {
            user_id: declaration.user_id.0,
            secondary_member_type_id: declaration.secondary_member_type_id.0,
        };
        Ok(ApprovedDeclaration {
            declaration: self.view(declaration)?,
            effect,
        })
    }

    pub fn reject(
        &self,
        caller: &Caller,
        id: RecordId,
        request: RejectRequest,
        now: DateTime<Utc>,
    ) -> Result<SelfDeclarationView, ServiceError> {
        let declaration = self
            .workflow
            .decide(id, caller, request.into_decision(), now, |_| Ok(()))?;
        self.view(declaration)
    }

    /// Declarations still awaiting review for one account.
    pub fn pending_for(&self, user_id: RecordId) -> Result<Vec<SelfDeclaration>, ServiceError> {
        Ok(self.workflow.store().select(&|declaration| {
            declaration.user_id == user_id && declaration.approval.is_pending()
        })?)
    }
}
