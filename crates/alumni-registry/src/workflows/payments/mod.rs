//! Member payments: submission with payer pre-fill, review, and the money
//! receipt issued on approval.

pub mod domain;
pub mod intake;
pub mod receipt;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{Payment, PaymentPurpose};
pub use intake::{PayerDefaults, PaymentSubmission, PaymentUpdate};
pub use receipt::{format_amount, receipt_date, receipt_path, render_receipt};
pub use router::payment_router;
pub use service::{
    payment_sms_body, ApprovedPayment, PaymentQuery, PaymentService, FILE_MISSING,
    RECEIPT_NOT_FOUND,
};
