// SPDX-License-Identifier: Apache-2.0

//! Best-effort mail. Delivery failures are the caller's to log; they
//! never fail the mutation that triggered them.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::{Message, SmtpTransport, Transport};
use std::fmt::{Display, Formatter};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug)]
pub struct NotifyError(pub String);

impl Display for NotifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "notification failed: {}", self.0)
    }
}

impl std::error::Error for NotifyError {}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, note: Notification) -> Result<(), NotifyError>;
}

/// SMTP delivery via lettre's blocking transport, run off the async
/// runtime's worker threads.
pub struct SmtpNotifier {
    transport: SmtpTransport,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(relay: &str, from: &str) -> Result<Self, NotifyError> {
        let transport = SmtpTransport::relay(relay)
            .map_err(|e| NotifyError(e.to_string()))?
            .build();
        let from = from.parse().map_err(|e: lettre::address::AddressError| {
            NotifyError(format!("bad sender address: {e}"))
        })?;
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn deliver(&self, note: Notification) -> Result<(), NotifyError> {
        let to: Mailbox = note.to.parse().map_err(|e: lettre::address::AddressError| {
            NotifyError(format!("bad recipient address: {e}"))
        })?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(note.subject)
            .body(note.body)
            .map_err(|e| NotifyError(e.to_string()))?;
        let transport = self.transport.clone();
        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| NotifyError(e.to_string()))?
            .map_err(|e| NotifyError(e.to_string()))?;
        Ok(())
    }
}

/// Stand-in when SMTP is unconfigured: logs and succeeds.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn deliver(&self, note: Notification) -> Result<(), NotifyError> {
        tracing::info!(to = %note.to, subject = %note.subject, "notification (console)");
        Ok(())
    }
}

/// Records instead of sending, for handler tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, note: Notification) -> Result<(), NotifyError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(note);
        }
        Ok(())
    }
}

/// Always fails, for exercising the best-effort path.
#[derive(Debug, Default)]
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn deliver(&self, _note: Notification) -> Result<(), NotifyError> {
        Err(NotifyError("relay refused connection".to_string()))
    }
}
