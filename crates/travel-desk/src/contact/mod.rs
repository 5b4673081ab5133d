//! General enquiries from the website contact form. Nothing is stored; the
//! message is forwarded to the agency inbox and acknowledged to the sender.

pub mod router;

use serde::{Deserialize, Serialize};

use crate::validation::{optional_text, ValidationErrors};

pub use router::contact_router;

/// Raw `POST /api/contact` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactSubmission {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
}

impl ContactSubmission {
    pub fn validate(self) -> Result<ContactMessage, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let first_name = errors.required("firstName", self.first_name, "First name is required");
        let last_name = errors.required("lastName", self.last_name, "Last name is required");
        let email = errors.email("email", self.email);
        let message = errors.required("message", self.message, "Message is required");

        errors.finish(ContactMessage {
            first_name,
            last_name,
            email,
            phone: optional_text(self.phone),
            message,
        })
    }
}

impl ContactMessage {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
