//! Outbound email: provider adapters, message templates, and the
//! fire-and-forget notifier used after a trip request or contact message.

mod console;
pub mod mailer;
pub mod notifier;
mod resend;
mod sendgrid;
pub mod templates;

use std::sync::Arc;

use crate::config::{MailConfig, MailProvider};

pub use console::ConsoleMailer;
pub use mailer::{EmailMessage, Mailbox, Mailer, MailerError};
pub use notifier::{DeliveryOutcome, NotificationResult, Notifier};
pub use resend::ResendMailer;
pub use sendgrid::SendGridMailer;

/// Construct the provider named by `MAIL_PROVIDER`. HTTP providers without an
/// API key yield a configuration error that the notifier records per message.
pub fn build_mailer(config: &MailConfig) -> Result<Arc<dyn Mailer>, MailerError> {
    let api_key = || {
        config
            .api_key
            .clone()
            .ok_or_else(|| MailerError::Configuration("MAIL_API_KEY is not set".to_string()))
    };

    let mailer: Arc<dyn Mailer> = match config.provider {
        MailProvider::Console => Arc::new(ConsoleMailer),
        MailProvider::Resend => Arc::new(ResendMailer::new(api_key()?)),
        MailProvider::SendGrid => Arc::new(SendGridMailer::new(api_key()?)),
    };
    Ok(mailer)
}

impl Notifier {
    pub fn from_config(config: &MailConfig) -> Self {
        let sender = config
            .from_address
            .clone()
            .map(|address| Mailbox::new(address, Some(config.from_name.clone())));
        Notifier::from_parts(
            build_mailer(config),
            config.admin_address.clone(),
            sender,
            config.timeout,
        )
    }
}
