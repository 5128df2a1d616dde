use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{error, info};

use super::domain::Payment;
use super::intake::{PayerDefaults, PaymentSubmission, PaymentUpdate};
use super::receipt::{format_amount, receipt_path, render_receipt};
use crate::outbound::{deliver, DocumentStore, Notification, Notifier, SmsMessage, StoredDocument};
use crate::workflows::approval::{
    require_authenticated, require_super_admin, ApprovalStatus, ApprovalStore, ApprovalWorkflow,
    Caller, Decision, ListQuery, Page, RecordId, SideEffect,
};
use crate::workflows::error::ServiceError;
use crate::workflows::members::MemberDirectory;
use crate::workflows::validation::present;

pub const RECEIPT_NOT_FOUND: &str = "Receipt not found.";
pub const FILE_MISSING: &str = "File does not exist.";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentQuery {
    #[serde(default)]
    pub status: Option<ApprovalStatus>,
    #[serde(default)]
    pub member_id: Option<String>,
    #[serde(default)]
    pub per_page: Option<i64>,
    #[serde(default)]
    pub page: Option<i64>,
}

impl PaymentQuery {
    fn pagination(&self) -> ListQuery {
        ListQuery {
            status: self.status,
            per_page: self.per_page,
            page: self.page,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApprovedPayment {
    pub payment: Payment,
    pub effect: SideEffect,
}

pub fn payment_sms_body(payment: &Payment) -> String {
    format!(
        "Your payment has been approved.\nAmount: BDT {}\nPurpose: {}\nThank you.",
        format_amount(payment.payment_amount),
        payment.payment_purpose.as_str()
    )
}

pub struct PaymentService {
    workflow: ApprovalWorkflow<Payment>,
    members: Arc<MemberDirectory>,
    documents: Arc<dyn DocumentStore>,
    notifier: Arc<dyn Notifier>,
}

impl PaymentService {
    pub fn new(
        store: Arc<dyn ApprovalStore<Payment>>,
        members: Arc<MemberDirectory>,
        documents: Arc<dyn DocumentStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            workflow: ApprovalWorkflow::new(store),
            members,
            documents,
            notifier,
        }
    }

    fn payer_defaults(&self, caller: &Caller) -> Result<Option<PayerDefaults>, ServiceError> {
        let Some(actor) = caller.actor() else {
            return Ok(None);
        };
        let Some(account) = self.members.account_for(actor)? else {
            return Ok(Some(PayerDefaults::default()));
        };
        let application = self.members.approved_application(&account)?;
        Ok(Some(PayerDefaults {
            address: application
                .as_ref()
                .map(|application| application.present_address.clone()),
            mobile_number: application.map(|application| application.mobile_number),
            name: Some(account.name),
            member_id: account.member_id,
        }))
    }

    fn member_known(&self, member_id: Option<String>) -> Result<Option<bool>, ServiceError> {
        member_id
            .map(|member_id| self.members.member_id_exists(&member_id))
            .transpose()
    }

    /// Open to everyone; signed-in payers may omit the fields their account supplies.
    pub fn submit(
        &self,
        caller: &Caller,
        submission: PaymentSubmission,
        now: DateTime<Utc>,
    ) -> Result<Payment, ServiceError> {
        let member_known = self.member_known(submission.member_id())?;
        let defaults = self.payer_defaults(caller)?;
        let payment = submission.validate(defaults, member_known, now)?;
        let stored = self.workflow.store().insert(payment)?;
        info!(id = %stored.id, purpose = stored.payment_purpose.as_str(), "payment submitted");
        Ok(stored)
    }

    /// Admins see every payment; members only those recorded under their member ID.
    pub fn list(&self, caller: &Caller, query: &PaymentQuery) -> Result<Page<Payment>, ServiceError> {
        let actor = require_authenticated(caller)?;
        let pagination = query.pagination();

        if actor.is_super_admin() {
            let member_id = present(query.member_id.as_deref());
            let rows = self.workflow.store().select(&|payment| {
                pagination.admits(payment.approval.status)
                    && member_id
                        .as_deref()
                        .map_or(true, |wanted| payment.member_id.as_deref() == Some(wanted))
            })?;
            return Ok(pagination.paginate(rows));
        }

        let own_member_id = self
            .members
            .account_for(actor)?
            .and_then(|account| account.member_id);
        let Some(own_member_id) = own_member_id else {
            return Ok(pagination.empty_page());
        };
        let rows = self
            .workflow
            .store()
            .select(&|payment| payment.member_id.as_deref() == Some(own_member_id.as_str()))?;
        Ok(ListQuery {
            status: None,
            ..pagination
        }
        .paginate(rows))
    }

    pub fn show(&self, caller: &Caller, id: RecordId) -> Result<Payment, ServiceError> {
        let actor = require_authenticated(caller)?;
        let payment = self.workflow.fetch(id)?;
        if actor.is_super_admin() {
            return Ok(payment);
        }
        let own_member_id = self
            .members
            .account_for(actor)?
            .and_then(|account| account.member_id);
        match (own_member_id, payment.member_id.as_deref()) {
            (Some(own), Some(owner)) if own == owner => Ok(payment),
            _ => Err(ServiceError::Forbidden),
        }
    }

    pub fn update(
        &self,
        caller: &Caller,
        id: RecordId,
        update: PaymentUpdate,
        now: DateTime<Utc>,
    ) -> Result<Payment, ServiceError> {
        let mut payment = self.workflow.load(id, caller)?;
        let member_known = self.member_known(update.member_id())?;
        update.apply(&mut payment, member_known, now)?;
        self.workflow.store().update(payment.clone())?;
        info!(id = %id, "payment updated");
        Ok(payment)
    }

    fn issue_receipt(&self, payment: &Payment, now: DateTime<Utc>) -> Result<String, ServiceError> {
        let path = receipt_path();
        let html = render_receipt(payment, now);
        self.documents
            .put(&path, &mime::TEXT_HTML_UTF_8, html.as_bytes())?;
        Ok(path)
    }

    /// Approves, then stores exactly one receipt and texts the payer. Receipt
    /// and SMS failures are logged; the approval stands.
    pub fn approve(
        &self,
        caller: &Caller,
        id: RecordId,
        now: DateTime<Utc>,
    ) -> Result<ApprovedPayment, ServiceError> {
        let mut payment = self
            .workflow
            .decide(id, caller, Decision::Approve, now, |_| Ok(()))?;

        let effect = match self.issue_receipt(&payment, now) {
            Ok(path) => {
                let mut with_receipt = payment.clone();
                with_receipt.receipt_file = Some(path.clone());
                with_receipt.updated_at = now;
                match self.workflow.store().update(with_receipt.clone()) {
                    Ok(()) => {
                        payment = with_receipt;
                        SideEffect::ReceiptIssued { receipt_file: path }
                    }
                    Err(err) => {
                        error!(id = %id, receipt = %path, error = %err, "money receipt could not be recorded");
                        SideEffect::None
                    }
                }
            }
            Err(err) => {
                error!(id = %id, error = %err, "money receipt could not be stored");
                SideEffect::None
            }
        };

        if let Some(mobile) = present(Some(payment.mobile_number.as_str())) {
            deliver(
                self.notifier.as_ref(),
                Notification::Sms(SmsMessage {
                    to: mobile,
                    body: payment_sms_body(&payment),
                }),
            );
        }

        Ok(ApprovedPayment { payment, effect })
    }

    /// Money receipt of an approved payment, for an admin or the paying member.
    pub fn receipt(&self, caller: &Caller, id: RecordId) -> Result<StoredDocument, ServiceError> {
        let payment = self.show(caller, id)?;
        let path = payment
            .receipt_file
            .ok_or(ServiceError::NotFound(RECEIPT_NOT_FOUND))?;
        self.documents
            .get(&path)?
            .ok_or(ServiceError::NotFound(FILE_MISSING))
    }

    pub fn reject(&self, caller: &Caller, id: RecordId, now: DateTime<Utc>) -> Result<Payment, ServiceError> {
        self.workflow
            .decide(id, caller, Decision::Reject { reason: None }, now, |_| Ok(()))
    }
}
