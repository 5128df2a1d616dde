use chrono::{DateTime, Utc};

use crate::workflows::approval::{transition, ActorId, Decision, RecordStore};
use crate::workflows::fixtures::{application, member_account, Registry};
use crate::workflows::members::UserAccount;
use crate::workflows::membership::{MembershipApplication, MembershipType};

/// Stores an application already approved at `approved_at`.
pub(super) fn approved_application(
    registry: &Registry,
    membership_type: MembershipType,
    email: Option<&str>,
    approved_at: DateTime<Utc>,
) -> MembershipApplication {
    let mut record = application(membership_type, Some(2012), None, email);
    transition(&mut record, &Decision::Approve, &ActorId(1), approved_at).expect("pending");
    registry
        .applications
        .insert(record)
        .expect("application stored")
}

pub(super) fn stored_member(
    registry: &Registry,
    name: &str,
    member_id: &str,
    membership_type: MembershipType,
    email: Option<&str>,
) -> UserAccount {
    registry
        .users
        .insert(member_account(
            name,
            member_id,
            membership_type,
            email,
            Some("01711000000"),
        ))
        .expect("member stored")
}
