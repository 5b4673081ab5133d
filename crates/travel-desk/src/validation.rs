//! Field-level validation shared by the public submission endpoints.

use std::fmt;

use serde::Serialize;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every problem found in one submission, in the order fields were checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|error| error.field == field)
    }

    /// `Ok(value)` when nothing was recorded.
    pub fn finish<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    /// Trim a required text field, recording `message` when it is blank.
    pub fn required(
        &mut self,
        field: &'static str,
        value: Option<String>,
        message: &str,
    ) -> String {
        match value.map(|raw| raw.trim().to_string()) {
            Some(trimmed) if !trimmed.is_empty() => trimmed,
            _ => {
                self.push(field, message);
                String::new()
            }
        }
    }

    /// Lowercase and shape-check a required email field.
    pub fn email(&mut self, field: &'static str, value: Option<String>) -> String {
        let email = self.required(field, value, "Email is required");
        if email.is_empty() {
            return email;
        }
        let email = email.to_lowercase();
        if !is_valid_email(&email) {
            self.push(field, "Please provide a valid email");
        }
        email
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Drop blank optional strings and trim the rest.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

/// `local@domain.tld` with no whitespace anywhere.
pub fn is_valid_email(candidate: &str) -> bool {
    if candidate.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = candidate.rsplit_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((name, tld)) => !name.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape_matches_local_at_domain() {
        assert!(is_valid_email("ann@example.com"));
        assert!(is_valid_email("first.last+tag@sub.example.co"));
        assert!(!is_valid_email("ann.example.com"));
        assert!(!is_valid_email("ann@localhost"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ann@.com"));
        assert!(!is_valid_email("ann@example."));
        assert!(!is_valid_email("ann lee@example.com"));
    }

    #[test]
    fn required_trims_and_records_blank_values() {
        let mut errors = ValidationErrors::new();
        assert_eq!(
            errors.required("destination", Some("  Accra ".to_string()), "required"),
            "Accra"
        );
        errors.required("visaType", Some("   ".to_string()), "Visa type is required");
        errors.required("fullName", None, "Full name is required");

        assert!(errors.contains("visaType"));
        assert!(errors.contains("fullName"));
        assert!(!errors.contains("destination"));
        assert_eq!(
            errors.to_string(),
            "visaType: Visa type is required; fullName: Full name is required"
        );
    }

    #[test]
    fn email_is_lowercased() {
        let mut errors = ValidationErrors::new();
        let email = errors.email("email", Some(" Ann@Example.COM ".to_string()));
        assert_eq!(email, "ann@example.com");
        assert!(errors.is_empty());
    }

    #[test]
    fn optional_text_drops_blank_strings() {
        assert_eq!(optional_text(Some(String::new())), None);
        assert_eq!(optional_text(Some("  ".to_string())), None);
        assert_eq!(
            optional_text(Some(" window seat ".to_string())),
            Some("window seat".to_string())
        );
    }
}
