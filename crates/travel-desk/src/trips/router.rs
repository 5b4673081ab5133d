use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{TripRequestId, TripSubmission};
use super::repository::TripRequestStore;
use super::service::{TripRequestService, TripServiceError};
use crate::auth::{authorize, Principal, TokenService, TripAction};
use crate::error::ApiError;

/// Shared state for the trip routes: the service plus the token verifier the
/// [`Principal`] extractor pulls out via `FromRef`.
pub struct TripState<S> {
    pub service: Arc<TripRequestService<S>>,
    pub tokens: Arc<TokenService>,
}

impl<S> Clone for TripState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            tokens: Arc::clone(&self.tokens),
        }
    }
}

impl<S> FromRef<TripState<S>> for Arc<TokenService> {
    fn from_ref(state: &TripState<S>) -> Self {
        Arc::clone(&state.tokens)
    }
}

/// `PUT /api/trips/:id` body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusUpdate {
    pub status: Option<String>,
}

/// Router builder exposing the public intake endpoint and the trip dashboard API.
pub fn trip_router<S>(service: Arc<TripRequestService<S>>, tokens: Arc<TokenService>) -> Router
where
    S: TripRequestStore + 'static,
{
    Router::new()
        .route("/api/plan-trip", post(submit_handler::<S>))
        .route("/api/trips", get(list_all_handler::<S>))
        .route("/api/trips/my", get(list_own_handler::<S>))
        .route(
            "/api/trips/:id",
            get(get_handler::<S>)
                .put(update_status_handler::<S>)
                .delete(delete_handler::<S>),
        )
        .with_state(TripState { service, tokens })
}

/// Public intake. A valid bearer token links the record to its account; a
/// missing or unusable one records an anonymous lead.
pub(crate) async fn submit_handler<S>(
    State(state): State<TripState<S>>,
    principal: Option<Principal>,
    payload: Result<Json<TripSubmission>, JsonRejection>,
) -> Result<Response, ApiError>
where
    S: TripRequestStore + 'static,
{
    let Json(submission) = payload?;
    let record = state.service.submit(submission, principal.as_ref()).await?;
    let body = json!({
        "success": true,
        "message": "Trip request received! We'll contact you soon.",
        "requestId": record.id,
    });
    Ok((StatusCode::OK, Json(body)).into_response())
}

pub(crate) async fn list_all_handler<S>(
    State(state): State<TripState<S>>,
    principal: Principal,
) -> Result<Response, ApiError>
where
    S: TripRequestStore + 'static,
{
    let trips = state.service.list_all(&principal).await?;
    let body = json!({ "success": true, "count": trips.len(), "trips": trips });
    Ok((StatusCode::OK, Json(body)).into_response())
}

pub(crate) async fn list_own_handler<S>(
    State(state): State<TripState<S>>,
    principal: Principal,
) -> Result<Response, ApiError>
where
    S: TripRequestStore + 'static,
{
    let trips = state.service.list_by_owner(&principal).await?;
    let body = json!({ "success": true, "count": trips.len(), "trips": trips });
    Ok((StatusCode::OK, Json(body)).into_response())
}

pub(crate) async fn get_handler<S>(
    State(state): State<TripState<S>>,
    principal: Principal,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError>
where
    S: TripRequestStore + 'static,
{
    let id = parse_id(&raw_id)?;
    let trip = state.service.get(&principal, &id).await?;
    Ok((StatusCode::OK, Json(json!({ "success": true, "trip": trip }))).into_response())
}

pub(crate) async fn update_status_handler<S>(
    State(state): State<TripState<S>>,
    principal: Principal,
    Path(raw_id): Path<String>,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> Result<Response, ApiError>
where
    S: TripRequestStore + 'static,
{
    // Admin check precedes id and body parsing.
    authorize(&principal, TripAction::UpdateStatus)?;
    let id = parse_id(&raw_id)?;
    let Json(update) = payload?;

    let trip = state
        .service
        .update_status(&principal, &id, update.status.as_deref())
        .await?;
    let body = json!({
        "success": true,
        "message": "Trip request updated",
        "trip": trip,
    });
    Ok((StatusCode::OK, Json(body)).into_response())
}

pub(crate) async fn delete_handler<S>(
    State(state): State<TripState<S>>,
    principal: Principal,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError>
where
    S: TripRequestStore + 'static,
{
    authorize(&principal, TripAction::Delete)?;
    let id = parse_id(&raw_id)?;
    state.service.delete(&principal, &id).await?;
    let body = json!({ "success": true, "message": "Trip request deleted" });
    Ok((StatusCode::OK, Json(body)).into_response())
}

fn parse_id(raw: &str) -> Result<TripRequestId, TripServiceError> {
    TripRequestId::parse(raw).ok_or(TripServiceError::NotFound)
}
