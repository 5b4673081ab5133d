use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use travel_desk::accounts::{account_router, AccountService, UserRepository};
use travel_desk::auth::TokenService;
use travel_desk::contact::contact_router;
use travel_desk::notifications::Notifier;
use travel_desk::trips::{trip_router, TripRequestService, TripRequestStore};

/// Public API plus the operational endpoints.
pub(crate) fn build_router<S, U>(
    trips: Arc<TripRequestService<S>>,
    accounts: Arc<AccountService<U>>,
    notifier: Notifier,
    tokens: Arc<TokenService>,
) -> Router
where
    S: TripRequestStore + 'static,
    U: UserRepository + 'static,
{
    Router::new()
        .merge(trip_router(trips, tokens))
        .merge(account_router(accounts))
        .merge(contact_router(notifier))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    if state.readiness.load(Ordering::Relaxed) {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "initializing" })),
        )
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
