use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmsMessage {
    pub to: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "channel", rename_all = "snake_case")]
pub enum Notification {
    Email(EmailMessage),
    Sms(SmsMessage),
}

impl Notification {
    pub fn channel(&self) -> &'static str {
        match self {
            Notification::Email(_) => "email",
            Notification::Sms(_) => "sms",
        }
    }

    pub fn recipient(&self) -> &str {
        match self {
            Notification::Email(message) => &message.to,
            Notification::Sms(message) => &message.to,
        }
    }

    pub fn body(&self) -> &str {
        match self {
            Notification::Email(message) => &message.body,
            Notification::Sms(message) => &message.body,
        }
    }
}

/// Outbound delivery for member-facing messages (mail relay, SMS gateway).
pub trait Notifier: Send + Sync {
    fn send_email(&self, message: EmailMessage) -> Result<(), NotificationError>;
    fn send_sms(&self, message: SmsMessage) -> Result<(), NotificationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
    #[error("recipient rejected: {0}")]
    Recipient(String),
}

/// Best-effort delivery: failures are logged and never reach the caller.
pub fn deliver(notifier: &dyn Notifier, notification: Notification) -> bool {
    let channel = notification.channel();
    let recipient = notification.recipient().to_string();
    let outcome = match notification {
        Notification::Email(message) => notifier.send_email(message),
        Notification::Sms(message) => notifier.send_sms(message),
    };

    match outcome {
        Ok(()) => true,
        Err(err) => {
            warn!(channel, %recipient, error = %err, "notification delivery failed");
            false
        }
    }
}

/// Writes deliveries to the log. Used when no gateway is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn send_email(&self, message: EmailMessage) -> Result<(), NotificationError> {
        info!(channel = "email", to = %message.to, subject = %message.subject, "notification dispatched");
        Ok(())
    }

    fn send_sms(&self, message: SmsMessage) -> Result<(), NotificationError> {
        info!(channel = "sms", to = %message.to, chars = message.body.chars().count(), "notification dispatched");
        Ok(())
    }
}

/// Keeps every delivery in memory so callers can inspect what was sent.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().expect("notifier mutex poisoned").clone()
    }

    pub fn sms(&self) -> Vec<SmsMessage> {
        self.sent()
            .into_iter()
            .filter_map(|notification| match notification {
                Notification::Sms(message) => Some(message),
                Notification::Email(_) => None,
            })
            .collect()
    }

    pub fn emails(&self) -> Vec<EmailMessage> {
        self.sent()
            .into_iter()
            .filter_map(|notification| match notification {
                Notification::Email(message) => Some(message),
                Notification::Sms(_) => None,
            })
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn send_email(&self, message: EmailMessage) -> Result<(), NotificationError> {
        self.sent
            .lock()
            .expect("notifier mutex poisoned")
            .push(Notification::Email(message));
        Ok(())
    }

    fn send_sms(&self, message: SmsMessage) -> Result<(), NotificationError> {
        self.sent
            .lock()
            .expect("notifier mutex poisoned")
            .push(Notification::Sms(message));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OfflineGateway;

    impl Notifier for OfflineGateway {
        fn send_email(&self, _message: EmailMessage) -> Result<(), NotificationError> {
            Err(NotificationError::Transport("smtp offline".to_string()))
        }

        fn send_sms(&self, _message: SmsMessage) -> Result<(), NotificationError> {
            Err(NotificationError::Transport("gateway offline".to_string()))
        }
    }

    #[test]
    fn deliver_swallows_transport_failures() {
        let delivered = deliver(
            &OfflineGateway,
            Notification::Sms(SmsMessage {
                to: "01711000000".to_string(),
                body: "hello".to_string(),
            }),
        );
        assert!(!delivered);
    }

    #[test]
    fn recording_notifier_splits_channels() {
        let notifier = RecordingNotifier::default();
        assert!(deliver(
            &notifier,
            Notification::Email(EmailMessage {
                to: "member@example.com".to_string(),
                subject: "Welcome".to_string(),
                body: "hi".to_string(),
            }),
        ));
        assert!(deliver(
            &notifier,
            Notification::Sms(SmsMessage {
                to: "01711000000".to_string(),
                body: "hi".to_string(),
            }),
        ));

        assert_eq!(notifier.emails().len(), 1);
        assert_eq!(notifier.sms()[0].to, "01711000000");
    }
}
