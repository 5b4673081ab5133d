use async_trait::async_trait;

use super::domain::User;
use crate::storage::StoreError;

/// Storage abstraction for accounts. Implementations must enforce email
/// uniqueness and report duplicates as [`StoreError::Conflict`].
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: User) -> Result<User, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}
