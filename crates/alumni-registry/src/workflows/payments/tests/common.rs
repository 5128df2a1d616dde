use std::sync::Arc;

use mime::Mime;
use rust_decimal::Decimal;

use crate::outbound::{DocumentError, DocumentStore, MemoryDocumentStore, StoredDocument};
use crate::workflows::approval::{
    ApprovalState, ApprovalStore, MemoryStore, RecordId, RecordStore, RepositoryError,
};
use crate::workflows::fixtures::{member_account, now, registry, Registry};
use crate::workflows::members::UserAccount;
use crate::workflows::membership::MembershipType;
use crate::workflows::payments::{Payment, PaymentPurpose, PaymentService};

pub(super) struct Harness {
    pub registry: Registry,
    pub payments: Arc<MemoryStore<Payment>>,
    pub documents: MemoryDocumentStore,
    pub service: Arc<PaymentService>,
}

pub(super) fn harness() -> Harness {
    harness_with_documents(None)
}

/// Document store that refuses every write.
pub(super) struct FullDisk;

impl DocumentStore for FullDisk {
    fn put(&self, _path: &str, _content_type: &Mime, _bytes: &[u8]) -> Result<(), DocumentError> {
        Err(DocumentError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "no space left on device",
        )))
    }

    fn get(&self, _path: &str) -> Result<Option<StoredDocument>, DocumentError> {
        Ok(None)
    }
}

/// Payment store whose plain updates fail once a row exists; decisions still commit.
pub(super) struct LockedUpdates(pub Arc<MemoryStore<Payment>>);

impl RecordStore<Payment> for LockedUpdates {
    fn insert(&self, record: Payment) -> Result<Payment, RepositoryError> {
        self.0.insert(record)
    }

    fn update(&self, _record: Payment) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database is read-only".to_string()))
    }

    fn fetch(&self, id: RecordId) -> Result<Option<Payment>, RepositoryError> {
        self.0.fetch(id)
    }

    fn select(&self, filter: &dyn Fn(&Payment) -> bool) -> Result<Vec<Payment>, RepositoryError> {
        self.0.select(filter)
    }
}

impl ApprovalStore<Payment> for LockedUpdates {
    fn commit_decision(&self, record: Payment) -> Result<(), RepositoryError> {
        self.0.commit_decision(record)
    }
}

pub(super) fn harness_with_documents(documents: Option<Arc<dyn DocumentStore>>) -> Harness {
    let registry = registry();
    let payments = Arc::new(MemoryStore::<Payment>::new());
    let memory_documents = MemoryDocumentStore::default();
    let documents = documents.unwrap_or_else(|| Arc::new(memory_documents.clone()));
    let service = Arc::new(PaymentService::new(
        payments.clone(),
        registry.directory.clone(),
        documents,
        Arc::new(registry.notifier.clone()),
    ));
    Harness {
        registry,
        payments,
        documents: memory_documents,
        service,
    }
}

impl Harness {
    pub fn member(&self, member_id: &str) -> UserAccount {
        self.registry
            .users
            .insert(member_account(
                "Rahim Uddin",
                member_id,
                MembershipType::General,
                Some("rahim@example.com"),
                Some("01711000000"),
            ))
            .expect("member stored")
    }

    pub fn pending(&self, member_id: Option<&str>, mobile_number: &str) -> RecordId {
        self.payments
            .insert(Payment {
                id: RecordId::default(),
                member_id: member_id.map(str::to_string),
                name: "Rahim Uddin".to_string(),
                address: "Jahapur".to_string(),
                mobile_number: mobile_number.to_string(),
                payment_purpose: PaymentPurpose::YearlySubscriptionGeneralMember,
                payment_method: Some("bKash".to_string()),
                payment_amount: Decimal::new(123450, 2),
                payment_proof_file: "payments/proof.png".to_string(),
                receipt_file: None,
                approval: ApprovalState::pending(),
                created_at: now(),
                updated_at: now(),
            })
            .expect("payment stored")
            .id
    }

    pub fn stored(&self, id: RecordId) -> Payment {
        self.payments
            .fetch(id)
            .expect("store readable")
            .expect("payment exists")
    }
}
