use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::domain::{TripRequest, TripRequestEntry, TripRequestId};
use super::status::TripStatus;
use crate::accounts::domain::UserId;
use crate::storage::StoreError;

/// Storage abstraction so the service module can be exercised in isolation.
///
/// Lists are ordered newest first by `created_at`.
#[async_trait]
pub trait TripRequestStore: Send + Sync {
    async fn insert(&self, record: TripRequest) -> Result<TripRequest, StoreError>;

    /// Every record, with the submitting account's name and email when known.
    async fn list_all(&self) -> Result<Vec<TripRequestEntry>, StoreError>;

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<TripRequest>, StoreError>;

    async fn fetch(&self, id: &TripRequestId) -> Result<Option<TripRequest>, StoreError>;

    /// Compare-and-set: writes `next` only while the stored status is still
    /// `expected`. Returns [`StoreError::StaleStatus`] when another writer got
    /// there first and [`StoreError::NotFound`] when the record is gone.
    async fn update_status(
        &self,
        id: &TripRequestId,
        expected: TripStatus,
        next: TripStatus,
        at: DateTime<Utc>,
    ) -> Result<TripRequest, StoreError>;

    async fn delete(&self, id: &TripRequestId) -> Result<(), StoreError>;
}
