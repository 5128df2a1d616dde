//! Self-declarations: a member claims a committee role and an administrator
//! confirms it onto the account.

pub mod domain;
pub mod intake;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{SelfDeclaration, SelfDeclarationView};
pub use intake::{parse_date, DeclarationSubmission};
pub use router::declaration_router;
pub use service::{ApprovedDeclaration, DeclarationService, ALREADY_ASSIGNED, ALREADY_PENDING};
