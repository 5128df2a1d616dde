//! Membership applications: public intake, fee pricing, and approval into a
//! member account.

pub mod domain;
pub mod fees;
pub mod intake;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    BloodGroup, Gender, MembershipApplication, MembershipType, PaymentYears,
    StudentshipProofType, TShirtSize, UnknownValue,
};
pub use fees::{quote, FeeQuote};
pub use intake::{MembershipSubmission, MembershipUpdate};
pub use router::membership_router;
pub use service::{ApprovedMembership, MembershipService};
