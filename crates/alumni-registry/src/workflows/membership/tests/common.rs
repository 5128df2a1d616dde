use std::sync::Arc;

use crate::workflows::approval::{ApprovalStore, RecordId, RecordStore};
use crate::workflows::fixtures::{application, registry, Registry};
use crate::workflows::membership::{MembershipApplication, MembershipService, MembershipType};

pub(super) struct Harness {
    pub registry: Registry,
    pub service: Arc<MembershipService>,
}

pub(super) fn harness() -> Harness {
    let registry = registry();
    let store: Arc<dyn ApprovalStore<MembershipApplication>> = registry.applications.clone();
    let service = Arc::new(MembershipService::new(store, registry.directory.clone()));
    Harness { registry, service }
}

impl Harness {
    pub fn pending(
        &self,
        membership_type: MembershipType,
        ssc_year: Option<i32>,
        jsc_year: Option<i32>,
        email: Option<&str>,
    ) -> RecordId {
        self.registry
            .applications
            .insert(application(membership_type, ssc_year, jsc_year, email))
            .expect("application stored")
            .id
    }

    pub fn stored(&self, id: RecordId) -> MembershipApplication {
        self.registry
            .applications
            .fetch(id)
            .expect("store readable")
            .expect("application exists")
    }
}
