//! Outbound adapters: member notifications and issued documents.

pub mod documents;
pub mod notify;

pub use documents::{DocumentError, DocumentStore, FsDocumentStore, MemoryDocumentStore, StoredDocument};
pub use notify::{
    deliver, EmailMessage, Notification, NotificationError, Notifier, RecordingNotifier,
    SmsMessage, TracingNotifier,
};
