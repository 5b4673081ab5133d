//! SendGrid v3 mail-send client.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::mailer::{ensure_accepted, EmailMessage, Mailer, MailerError};

const SENDGRID_ENDPOINT: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Debug, Clone)]
pub struct SendGridMailer {
    http: Client,
    api_key: String,
    endpoint: String,
}

impl SendGridMailer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            endpoint: SENDGRID_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

pub(crate) fn request_body(message: &EmailMessage) -> Value {
    let mut from = json!({ "email": message.from.address });
    if let Some(name) = &message.from.name {
        from["name"] = json!(name);
    }
    json!({
        "personalizations": [{ "to": [{ "email": message.to }] }],
        "from": from,
        "subject": message.subject,
        "content": [{ "type": "text/html", "value": message.html }],
    })
}

#[async_trait]
impl Mailer for SendGridMailer {
    fn provider(&self) -> &'static str {
        "sendgrid"
    }

    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request_body(message))
            .send()
            .await?;
        ensure_accepted(response).await
    }
}
