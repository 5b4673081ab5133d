use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;

use super::domain::{AuthSession, Credentials, Registration};
use super::repository::UserRepository;
use super::service::AccountService;
use crate::error::ApiError;

/// `POST /api/auth/register` and `POST /api/auth/login`.
pub fn account_router<U>(service: Arc<AccountService<U>>) -> Router
where
    U: UserRepository + 'static,
{
    Router::new()
        .route("/api/auth/register", post(register_handler::<U>))
        .route("/api/auth/login", post(login_handler::<U>))
        .with_state(service)
}

pub(crate) async fn register_handler<U>(
    State(service): State<Arc<AccountService<U>>>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> Result<Response, ApiError>
where
    U: UserRepository + 'static,
{
    let Json(registration) = payload?;
    let session = service.register(registration).await?;
    Ok((StatusCode::CREATED, session_body(session)).into_response())
}

pub(crate) async fn login_handler<U>(
    State(service): State<Arc<AccountService<U>>>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Response, ApiError>
where
    U: UserRepository + 'static,
{
    let Json(credentials) = payload?;
    let session = service.login(credentials).await?;
    Ok((StatusCode::OK, session_body(session)).into_response())
}

fn session_body(session: AuthSession) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "token": session.token,
        "expiresAt": session.expires_at,
        "user": session.user,
    }))
}
