use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;
use tracing::info;

use super::ContactSubmission;
use crate::error::ApiError;
use crate::notifications::Notifier;

pub fn contact_router(notifier: Notifier) -> Router {
    Router::new()
        .route("/api/contact", post(contact_handler))
        .with_state(notifier)
}

pub(crate) async fn contact_handler(
    State(notifier): State<Notifier>,
    payload: Result<Json<ContactSubmission>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(submission) = payload?;
    let message = submission.validate()?;
    info!(email = %message.email, "contact message received");

    drop(notifier.dispatch_contact(message));
    let body = json!({
        "success": true,
        "message": "Thanks for reaching out! We'll get back to you soon.",
    });
    Ok((StatusCode::OK, Json(body)).into_response())
}
