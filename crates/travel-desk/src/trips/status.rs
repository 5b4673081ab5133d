//! Trip request lifecycle.
//!
//! ```text
//! pending ──► contacted ──► completed
//!    │            │
//!    └────────────┴──► cancelled
//! ```
//!
//! `completed` and `cancelled` are terminal. Nothing moves back into
//! `pending`; it is only assigned at creation. Re-applying the current status
//! is accepted so the caller can refresh `updatedAt`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::validation::ValidationErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    #[default]
    Pending,
    Contacted,
    Completed,
    Cancelled,
}

impl TripStatus {
    pub const ALL: [TripStatus; 4] = [
        TripStatus::Pending,
        TripStatus::Contacted,
        TripStatus::Completed,
        TripStatus::Cancelled,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            TripStatus::Pending => "pending",
            TripStatus::Contacted => "contacted",
            TripStatus::Completed => "completed",
            TripStatus::Cancelled => "cancelled",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, TripStatus::Completed | TripStatus::Cancelled)
    }

    /// Parse a client-supplied status, reporting anything outside the four
    /// states as a field error.
    pub fn parse_requested(raw: Option<&str>) -> Result<Self, ValidationErrors> {
        match raw.map(str::trim) {
            None | Some("") => Err(ValidationErrors::single("status", "Status is required")),
            Some(value) => value.parse().map_err(|err: UnknownStatus| {
                ValidationErrors::single("status", err.to_string())
            }),
        }
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid status '{0}': expected one of pending, contacted, completed, cancelled")]
pub struct UnknownStatus(pub String);

impl FromStr for TripStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        TripStatus::ALL
            .into_iter()
            .find(|status| status.label() == value)
            .ok_or_else(|| UnknownStatus(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("cannot move a trip request from {from} to {to}")]
    NotAllowed { from: TripStatus, to: TripStatus },
}

/// Validate `current -> requested`, returning the status to store.
pub fn transition(current: TripStatus, requested: TripStatus) -> Result<TripStatus, TransitionError> {
    if can_transition(current, requested) {
        Ok(requested)
    } else {
        Err(TransitionError::NotAllowed {
            from: current,
            to: requested,
        })
    }
}

pub fn can_transition(current: TripStatus, requested: TripStatus) -> bool {
    use TripStatus::*;

    current == requested
        || matches!(
            (current, requested),
            (Pending, Contacted) | (Contacted, Completed) | (Pending | Contacted, Cancelled)
        )
}
