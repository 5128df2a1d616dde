use crate::outbound::{EmailMessage, Notification, SmsMessage};

pub fn approval_sms_body(member_id: &str, password: &str, frontend_url: &str) -> String {
    format!(
        "Congratulations! Your membership application has been approved.\n\
         Member ID: {member_id}\n\
         Password: {password}\n\
         Login at: {frontend_url}"
    )
}

/// Credentials go by email when the member has one and by SMS otherwise.
pub fn credentials_notification(
    email: Option<&str>,
    phone: Option<&str>,
    name: &str,
    member_id: &str,
    password: &str,
    frontend_url: &str,
) -> Option<Notification> {
    if let Some(email) = email.filter(|value| !value.trim().is_empty()) {
        return Some(Notification::Email(EmailMessage {
            to: email.to_string(),
            subject: "Your membership application has been approved".to_string(),
            body: format!(
                "Dear {name},\n\n{}\n",
                approval_sms_body(member_id, password, frontend_url)
            ),
        }));
    }
    phone
        .filter(|value| !value.trim().is_empty())
        .map(|phone| {
            Notification::Sms(SmsMessage {
                to: phone.to_string(),
                body: approval_sms_body(member_id, password, frontend_url),
            })
        })
}
