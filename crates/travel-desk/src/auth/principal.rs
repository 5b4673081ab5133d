use serde::Serialize;

use super::error::AuthError;
use crate::accounts::domain::{Role, UserId};

/// Authenticated identity attached to a request after token verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_role(&self, role: Role) -> Result<&Self, AuthError> {
        if self.role == role {
            Ok(self)
        } else {
            Err(AuthError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_role_rejects_mismatch() {
        let traveler = Principal {
            user_id: UserId::generate(),
            role: Role::User,
        };
        assert_eq!(traveler.require_role(Role::Admin), Err(AuthError::Forbidden));
        assert_eq!(traveler.require_role(Role::User), Ok(&traveler));
        assert!(!traveler.is_admin());
    }
}
