use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use super::domain::{ScholarshipApplication, ScholarshipApplicationView};
use super::intake::ScholarshipSubmission;
use crate::workflows::approval::{
    require_super_admin, ApprovalStatus, ApprovalStore, ApprovalWorkflow, Caller, Decision,
    ListQuery, Page, RecordId, RejectRequest,
};
use crate::workflows::catalog::CatalogService;
use crate::workflows::error::ServiceError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScholarshipApplicationQuery {
    #[serde(default)]
    pub status: Option<ApprovalStatus>,
    #[serde(default)]
    pub scholarship_id: Option<u64>,
    #[serde(default)]
    pub per_page: Option<i64>,
    #[serde(default)]
    pub page: Option<i64>,
}

pub struct ScholarshipService {
    workflow: ApprovalWorkflow<ScholarshipApplication>,
    catalog: Arc<CatalogService>,
}

impl ScholarshipService {
    pub fn new(
        store: Arc<dyn ApprovalStore<ScholarshipApplication>>,
        catalog: Arc<CatalogService>,
    ) -> Self {
        Self {
            workflow: ApprovalWorkflow::new(store),
            catalog,
        }
    }

    fn view(&self, application: ScholarshipApplication) -> Result<ScholarshipApplicationView, ServiceError> {
        let scholarship = self.catalog.scholarship(application.scholarship_id)?;
        Ok(ScholarshipApplicationView {
            application,
            scholarship,
        })
    }

    /// Open to everyone; a signed-in applicant is linked to the application.
    pub fn submit(
        &self,
        caller: &Caller,
        submission: ScholarshipSubmission,
        now: DateTime<Utc>,
    ) -> Result<ScholarshipApplicationView, ServiceError> {
        let scholarship_known = match submission.scholarship_id() {
            Some(id) => self.catalog.scholarship(id)?.is_some(),
            None => false,
        };
        let user_id = caller.actor().map(|actor| RecordId(actor.id.0));
        let application = submission.validate(scholarship_known, user_id, now)?;
        let stored = self.workflow.store().insert(application)?;
        info!(
            id = %stored.id,
            scholarship_id = %stored.scholarship_id,
            "scholarship application submitted"
        );
        self.view(stored)
    }

    pub fn list(
        &self,
        caller: &Caller,
        query: &ScholarshipApplicationQuery,
    ) -> Result<Page<ScholarshipApplicationView>, ServiceError> {
        require_super_admin(caller)?;
        let pagination = ListQuery {
            status: query.status,
            per_page: query.per_page,
            page: query.page,
        };
        let rows = self.workflow.store().select(&|application| {
            pagination.admits(application.approval.status)
                && query
                    .scholarship_id
                    .map_or(true, |wanted| application.scholarship_id == RecordId(wanted))
        })?;
        let page = pagination.paginate(rows);
        let mut views = Vec::with_capacity(page.data.len());
        for application in page.data {
            views.push(self.view(application)?);
        }
        Ok(Page {
            data: views,
            meta: page.meta,
        })
    }

    pub fn show(&self, caller: &Caller, id: RecordId) -> Result<ScholarshipApplicationView, ServiceError> {
        let application = self.workflow.load(id, caller)?;
        self.view(application)
    }

    pub fn approve(
        &self,
        caller: &Caller,
        id: RecordId,
        now: DateTime<Utc>,
    ) -> Result<ScholarshipApplicationView, ServiceError> {
        let application = self
            .workflow
            .decide(id, caller, Decision::Approve, now, |_| Ok(()))?;
        self.view(application)
    }

    pub fn reject(
        &self,
        caller: &Caller,
        id: RecordId,
        request: RejectRequest,
        now: DateTime<Utc>,
    ) -> Result<ScholarshipApplicationView, ServiceError> {
        let application = self
            .workflow
            .decide(id, caller, request.into_decision(), now, |_| Ok(()))?;
        self.view(application)
    }
}
