use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::accounts::domain::{Role, UserId};
use crate::auth::{Principal, TokenService};
use crate::notifications::{EmailMessage, Mailbox, Mailer, MailerError, Notifier};
use crate::storage::StoreError;
use crate::trips::domain::{
    OwnerSummary, TripRequest, TripRequestEntry, TripRequestId, TripSubmission,
};
use crate::trips::repository::TripRequestStore;
use crate::trips::status::TripStatus;
use crate::trips::{trip_router, TripRequestService};

pub(super) const AGENCY_ADDRESS: &str = "leads@example.com";

pub(super) fn submission() -> TripSubmission {
    serde_json::from_value(submission_json()).expect("valid submission")
}

pub(super) fn submission_json() -> Value {
    json!({
        "fullName": "Ann Lee",
        "email": "ann@example.com",
        "destination": "Accra",
        "departureCity": "Boston",
        "takeOffDay": "2025-06-01",
        "people": 2,
        "visaType": "Tourist"
    })
}

pub(super) fn admin() -> Principal {
    Principal {
        user_id: UserId::generate(),
        role: Role::Admin,
    }
}

pub(super) fn traveler() -> Principal {
    Principal {
        user_id: UserId::generate(),
        role: Role::User,
    }
}

pub(super) fn token_service() -> Arc<TokenService> {
    Arc::new(TokenService::new(
        b"trip-routing-secret",
        Duration::from_secs(3600),
        "travel-desk",
    ))
}

pub(super) fn bearer(tokens: &TokenService, principal: &Principal) -> String {
    let issued = tokens
        .issue_at(principal.user_id, principal.role, Utc::now())
        .expect("token issued");
    format!("Bearer {}", issued.token)
}

pub(super) struct Harness {
    pub(super) service: Arc<TripRequestService<MemoryStore>>,
    pub(super) store: Arc<MemoryStore>,
    pub(super) mailer: Arc<RecordingMailer>,
    pub(super) tokens: Arc<TokenService>,
}

impl Harness {
    pub(super) fn router(&self) -> axum::Router {
        trip_router(self.service.clone(), self.tokens.clone())
    }
}

pub(super) fn harness() -> Harness {
    harness_with(MemoryStore::default())
}

pub(super) fn harness_with(store: MemoryStore) -> Harness {
    let mailer = Arc::new(RecordingMailer::default());
    let notifier = Notifier::new(
        mailer.clone(),
        AGENCY_ADDRESS,
        Mailbox::new("desk@example.com", Some("Greater & Better Travel".to_string())),
    );
    Harness {
        mailer,
        ..harness_with_notifier(store, notifier)
    }
}

pub(super) fn harness_with_notifier(store: MemoryStore, notifier: Notifier) -> Harness {
    let store = Arc::new(store);
    Harness {
        service: Arc::new(TripRequestService::new(store.clone(), notifier)),
        store,
        mailer: Arc::new(RecordingMailer::default()),
        tokens: token_service(),
    }
}

/// In-memory store mirroring the Postgres semantics, including the
/// compare-and-set status update.
#[derive(Default)]
pub(super) struct MemoryStore {
    records: Mutex<HashMap<TripRequestId, TripRequest>>,
    owners: Mutex<HashMap<UserId, OwnerSummary>>,
    fail_writes: bool,
}

impl MemoryStore {
    pub(super) fn unavailable() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub(super) fn register_owner(&self, id: UserId, name: &str, email: &str) {
        self.owners.lock().expect("owners mutex poisoned").insert(
            id,
            OwnerSummary {
                name: name.to_string(),
                email: email.to_string(),
            },
        );
    }

    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("records mutex poisoned").len()
    }

    pub(super) fn get(&self, id: &TripRequestId) -> Option<TripRequest> {
        self.records
            .lock()
            .expect("records mutex poisoned")
            .get(id)
            .cloned()
    }

    fn newest_first(mut records: Vec<TripRequest>) -> Vec<TripRequest> {
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }
}

#[async_trait]
impl TripRequestStore for MemoryStore {
    async fn insert(&self, record: TripRequest) -> Result<TripRequest, StoreError> {
        if self.fail_writes {
            return Err(StoreError::Unavailable("database offline".to_string()));
        }
        let mut guard = self.records.lock().expect("records mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list_all(&self) -> Result<Vec<TripRequestEntry>, StoreError> {
        let records: Vec<_> = self
            .records
            .lock()
            .expect("records mutex poisoned")
            .values()
            .cloned()
            .collect();
        let owners = self.owners.lock().expect("owners mutex poisoned");
        Ok(Self::newest_first(records)
            .into_iter()
            .map(|trip| {
                let owner = trip.user_id.and_then(|id| owners.get(&id).cloned());
                TripRequestEntry { trip, owner }
            })
            .collect())
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<TripRequest>, StoreError> {
        let records = self
            .records
            .lock()
            .expect("records mutex poisoned")
            .values()
            .filter(|record| record.user_id.as_ref() == Some(owner))
            .cloned()
            .collect();
        Ok(Self::newest_first(records))
    }

    async fn fetch(&self, id: &TripRequestId) -> Result<Option<TripRequest>, StoreError> {
        Ok(self.get(id))
    }

    async fn update_status(
        &self,
        id: &TripRequestId,
        expected: TripStatus,
        next: TripStatus,
        at: DateTime<Utc>,
    ) -> Result<TripRequest, StoreError> {
        if self.fail_writes {
            return Err(StoreError::Unavailable("database offline".to_string()));
        }
        let mut guard = self.records.lock().expect("records mutex poisoned");
        let record = guard.get_mut(id).ok_or(StoreError::NotFound)?;
        if record.status != expected {
            return Err(StoreError::StaleStatus);
        }
        record.status = next;
        record.updated_at = at;
        Ok(record.clone())
    }

    async fn delete(&self, id: &TripRequestId) -> Result<(), StoreError> {
        self.records
            .lock()
            .expect("records mutex poisoned")
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[derive(Debug, Default)]
pub(super) struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingMailer {
    pub(super) fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }

    /// Wait for the detached notification task to deliver `count` messages.
    pub(super) async fn wait_for(&self, count: usize) -> Vec<EmailMessage> {
        for _ in 0..200 {
            let sent = self.sent();
            if sent.len() >= count {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.sent()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    fn provider(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError> {
        self.sent
            .lock()
            .expect("mailer mutex poisoned")
            .push(message.clone());
        Ok(())
    }
}

pub(super) fn json_request(method: &str, uri: &str, auth: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

pub(super) fn empty_request(method: &str, uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::empty()).expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
