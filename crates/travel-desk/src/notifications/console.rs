use async_trait::async_trait;
use tracing::{debug, info};

use super::mailer::{EmailMessage, Mailer, MailerError};

/// Development mailer: writes each message to the log instead of sending it.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleMailer;

#[async_trait]
impl Mailer for ConsoleMailer {
    fn provider(&self) -> &'static str {
        "console"
    }

    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError> {
        info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            "email (console delivery)"
        );
        debug!(html = %message.html, "email body");
        Ok(())
    }
}
