//! Membership registry for an alumni association: intake, approval workflows,
//! payments and member accounts, exposed through axum routers.

pub mod config;
pub mod error;
pub mod outbound;
pub mod telemetry;
pub mod workflows;
