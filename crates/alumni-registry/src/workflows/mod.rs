//! Domain workflows. Each family pairs a service holding its stores with an
//! axum router that delegates to it.

pub mod approval;
pub mod catalog;
pub mod declarations;
pub mod error;
pub mod members;
pub mod membership;
pub mod payments;
pub mod scholarships;
pub mod validation;

#[cfg(test)]
pub(crate) mod fixtures;

pub use error::ServiceError;
