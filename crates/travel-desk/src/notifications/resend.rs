//! Resend HTTP API client.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::mailer::{ensure_accepted, EmailMessage, Mailer, MailerError};

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Debug, Clone)]
pub struct ResendMailer {
    http: Client,
    api_key: String,
    endpoint: String,
}

impl ResendMailer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            endpoint: RESEND_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

pub(crate) fn request_body(message: &EmailMessage) -> Value {
    json!({
        "from": message.from.to_string(),
        "to": [message.to],
        "subject": message.subject,
        "html": message.html,
    })
}

#[async_trait]
impl Mailer for ResendMailer {
    fn provider(&self) -> &'static str {
        "resend"
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
