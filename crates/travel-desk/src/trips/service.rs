use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};

use super::domain::{TripRequest, TripRequestEntry, TripRequestId, TripSubmission};
use super::repository::TripRequestStore;
use super::status::{self, TransitionError, TripStatus};
use crate::auth::{authorize, AuthError, Principal, TripAction};
use crate::notifications::Notifier;
use crate::storage::StoreError;
use crate::validation::ValidationErrors;

/// Service composing validation, authorization, the status engine, the store,
/// and the notifier.
pub struct TripRequestService<S> {
    store: Arc<S>,
    notifier: Notifier,
}

impl<S> TripRequestService<S>
where
    S: TripRequestStore + 'static,
{
    pub fn new(store: Arc<S>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    /// Validate and persist a new request, then hand it to the notifier
    /// without waiting. `owner` is attached when the caller was authenticated.
    pub async fn submit(
        &self,
        submission: TripSubmission,
        owner: Option<&Principal>,
    ) -> Result<TripRequest, TripServiceError> {
        let request = submission.validate()?;
        let record = request.into_record(owner.map(|principal| principal.user_id), Utc::now());

        let stored = self.store.insert(record).await.map_err(|err| {
            error!(error = %err, "failed to persist trip request");
            err
        })?;
        info!(
            request_id = %stored.id,
            destination = %stored.destination,
            authenticated = stored.user_id.is_some(),
            "trip request stored"
        );

        drop(self.notifier.dispatch_new_request(stored.clone()));
        Ok(stored)
    }

    pub async fn list_all(
        &self,
        principal: &Principal,
    ) -> Result<Vec<TripRequestEntry>, TripServiceError> {
        authorize(principal, TripAction::ListAll)?;
        Ok(self.store.list_all().await?)
    }

    pub async fn list_by_owner(
        &self,
        principal: &Principal,
    ) -> Result<Vec<TripRequest>, TripServiceError> {
        authorize(principal, TripAction::ListOwn)?;
        Ok(self.store.list_by_owner(&principal.user_id).await?)
    }

    /// Owners read their own records; admins read everything. A record the
    /// caller may not read is reported as forbidden, not hidden.
    pub async fn get(
        &self,
        principal: &Principal,
        id: &TripRequestId,
    ) -> Result<TripRequest, TripServiceError> {
        let record = self.fetch_existing(id).await?;
        authorize(
            principal,
            TripAction::Read {
                owner: record.user_id.as_ref(),
            },
        )?;
        Ok(record)
    }

    /// Apply an admin status change. The requested value is checked against
    /// the lifecycle before the store is touched.
    pub async fn update_status(
        &self,
        principal: &Principal,
        id: &TripRequestId,
        requested: Option<&str>,
    ) -> Result<TripRequest, TripServiceError> {
        authorize(principal, TripAction::UpdateStatus)?;
        let requested = TripStatus::parse_requested(requested)?;

        let current = self.fetch_existing(id).await?;
        let next = status::transition(current.status, requested)?;

        let updated = self
            .store
            .update_status(id, current.status, next, Utc::now())
            .await?;
        info!(
            request_id = %updated.id,
            from = %current.status,
            to = %updated.status,
            "trip request status updated"
        );
        Ok(updated)
    }

    pub async fn delete(
        &self,
        principal: &Principal,
        id: &TripRequestId,
    ) -> Result<(), TripServiceError> {
        authorize(principal, TripAction::Delete)?;
        self.store.delete(id).await?;
        info!(request_id = %id, "trip request deleted");
        Ok(())
    }

    async fn fetch_existing(&self, id: &TripRequestId) -> Result<TripRequest, TripServiceError> {
        self.store
            .fetch(id)
            .await?
            .ok_or(TripServiceError::NotFound)
    }
}

/// Error raised by the trip request service.
#[derive(Debug, thiserror::Error)]
pub enum TripServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("trip request not found")]
    NotFound,
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for TripServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound => Self::NotFound,
            other => Self::Store(other),
        }
    }
}
