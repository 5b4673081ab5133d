use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

/// Sender or recipient with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    pub address: String,
    pub name: Option<String>,
}

impl Mailbox {
    pub fn new(address: impl Into<String>, name: Option<String>) -> Self {
        Self {
            address: address.into(),
            name,
        }
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} <{}>", self.address),
            None => f.write_str(&self.address),
        }
    }
}

/// A fully addressed HTML message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: Mailbox,
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MailerError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("provider rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

impl From<reqwest::Error> for MailerError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value.to_string())
    }
}

/// Outbound email capability. Implementations make exactly one delivery
/// attempt per call; retries and timeouts belong to the caller.
#[async_trait]
pub trait Mailer: Send + Sync + fmt::Debug {
    fn provider(&self) -> &'static str;

    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError>;
}

/// Turn a non-2xx provider reply into [`MailerError::Rejected`].
pub(crate) async fn ensure_accepted(response: reqwest::Response) -> Result<(), MailerError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(MailerError::Rejected {
        status: status.as_u16(),
        body,
    })
}
