use crate::accounts::AccountError;
use crate::auth::AuthError;
use crate::config::ConfigError;
use crate::storage::StoreError;
use crate::telemetry::TelemetryError;
use crate::trips::TripServiceError;
use crate::validation::ValidationErrors;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;
use tracing::error;

/// Startup and process-level failures.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Store(StoreError),
    Account(AccountError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Store(err) => write!(f, "database error: {}", err),
            AppError::Account(err) => write!(f, "account error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Store(err) => Some(err),
            AppError::Account(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<AccountError> for AppError {
    fn from(value: AccountError) -> Self {
        Self::Account(value)
    }
}

/// HTTP-facing error. Every handler failure funnels through here so the status
/// mapping and the `{"success": false, ...}` body live in one place.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    fields: Option<ValidationErrors>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            fields: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Log the cause and hide it from the client.
    fn internal(cause: &dyn fmt::Display) -> Self {
        error!(error = %cause, "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "success": false,
            "error": self.message,
        });
        if let Some(fields) = self.fields {
            body["fields"] = json!(fields);
        }
        (self.status, Json(body)).into_response()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(value: ValidationErrors) -> Self {
        let message = value
            .fields()
            .iter()
            .map(|field| field.message.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            status: StatusCode::BAD_REQUEST,
            message,
            fields: Some(value),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, value.body_text())
    }
}

impl From<AuthError> for ApiError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::MissingToken | AuthError::InvalidToken(_) | AuthError::ExpiredToken => {
                Self::new(StatusCode::UNAUTHORIZED, value.to_string())
            }
            AuthError::Forbidden => Self::new(StatusCode::FORBIDDEN, value.to_string()),
            AuthError::Signing(_) => Self::internal(&value),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound => Self::not_found(value.to_string()),
            StoreError::Conflict | StoreError::StaleStatus => {
                Self::new(StatusCode::CONFLICT, value.to_string())
            }
            StoreError::Corrupt(_) | StoreError::Unavailable(_) => Self::internal(&value),
        }
    }
}

impl From<TripServiceError> for ApiError {
    fn from(value: TripServiceError) -> Self {
        match value {
            TripServiceError::Validation(errors) => errors.into(),
            TripServiceError::Auth(err) => err.into(),
            TripServiceError::NotFound => Self::not_found("Trip request not found"),
            TripServiceError::Transition(err) => Self::new(StatusCode::BAD_REQUEST, err.to_string()),
            TripServiceError::Store(err) => err.into(),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(value: AccountError) -> Self {
        match value {
            AccountError::Validation(errors) => errors.into(),
            AccountError::EmailTaken => Self::new(StatusCode::CONFLICT, value.to_string()),
            AccountError::InvalidCredentials => {
                Self::new(StatusCode::UNAUTHORIZED, value.to_string())
            }
            AccountError::Token(err) => err.into(),
            AccountError::Store(err) => err.into(),
            AccountError::Password(_) => Self::internal(&value),
        }
    }
}
