//! Lead capture backend for a travel agency: public trip and contact forms,
//! traveler accounts, and the admin dashboard API.

pub mod accounts;
pub mod auth;
pub mod config;
pub mod contact;
pub mod error;
pub mod notifications;
pub mod storage;
pub mod telemetry;
pub mod trips;
pub mod validation;

pub use error::{ApiError, AppError};
