//! Member accounts created from approved applications.

pub mod account;
pub mod credentials;
pub mod expiry;
pub mod member_id;
pub mod messages;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use account::{AccountSummary, MemberInfo, MemberProfile, MemberView, UserAccount};
pub use credentials::{generate_password, CredentialError, IssuedPassword, PasswordIssuer};
pub use expiry::{add_years, compute_expiry, renewal_base};
pub use member_id::{allocate, format_member_id, next_sequence, sequence_of, MemberIdError};
pub use router::member_router;
pub use service::{
    BackfillReport, MemberDirectory, MemberQuery, ProfileMigrationReport, Provisioned,
    RenewRequest, LIFETIME_NOT_RENEWABLE, MEMBER_NOT_FOUND, MISSING_PHONE,
};
