//! The one place that decides who may do what with a trip request.

use super::error::AuthError;
use super::principal::Principal;
use crate::accounts::domain::{Role, UserId};

/// Operations on trip requests that require an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripAction<'a> {
    ListAll,
    ListOwn,
    /// Reading one record; `owner` is the record's back-reference, if any.
    Read { owner: Option<&'a UserId> },
    UpdateStatus,
    Delete,
}

pub fn authorize(principal: &Principal, action: TripAction<'_>) -> Result<(), AuthError> {
    match action {
        TripAction::ListOwn => Ok(()),
        TripAction::ListAll | TripAction::UpdateStatus | TripAction::Delete => {
            principal.require_role(Role::Admin).map(|_| ())
        }
        TripAction::Read { owner } => {
            if principal.is_admin() || owner == Some(&principal.user_id) {
                Ok(())
            } else {
                Err(AuthError::Forbidden)
            }
        }
    }
}
