//! Pending/approved/rejected state machine shared by every approvable record.
//!
//! Records implement [`Approvable`]; [`ApprovalWorkflow`] performs the
//! authorized, conditional transition and leaves side effects to the callers.

pub mod identity;
pub mod page;
pub mod status;
pub mod store;
pub mod workflow;

#[cfg(test)]
mod tests;

pub use identity::{
    require_authenticated, require_super_admin, Actor, ActorId, Caller, IdentityProvider, Role,
    SharedIdentity, StaticTokenIdentity,
};
pub use page::{ListQuery, Page, PageMeta};
pub use status::{
    transition, Approvable, ApprovableKind, ApprovalState, ApprovalStatus, Decision, RejectRequest,
    SideEffect, TransitionError,
};
pub use store::{ApprovalStore, MemoryStore, Record, RecordId, RecordStore, RepositoryError};
pub use workflow::ApprovalWorkflow;
