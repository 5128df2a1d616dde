//! Scholarship applications against the seeded programmes.

pub mod domain;
pub mod intake;
pub mod router;
pub mod service;


pub use domain::{normalize_phone, ScholarshipApplication, ScholarshipApplicationView};
pub use intake::ScholarshipSubmission;
pub use router::scholarship_router;
pub use service::{ScholarshipApplicationQuery, ScholarshipService};
