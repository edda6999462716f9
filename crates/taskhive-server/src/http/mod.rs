// SPDX-License-Identifier: Apache-2.0

//! Request plumbing shared by every handler: request ids, session
//! authentication, the error-to-response mapping, and best-effort
//! notification dispatch.

pub(crate) mod catalog;
pub(crate) mod dashboard;
pub(crate) mod reports;
pub(crate) mod sessions;
pub(crate) mod tasks;
pub(crate) mod volunteers;

use crate::AppState;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use taskhive_api::ApiError;
use taskhive_model::UserId;
use taskhive_policies::{authorize, Action, Requester, Resource};

pub(crate) fn request_id(headers: &HeaderMap, state: &AppState) -> String {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
        .unwrap_or_else(|| {
            let id = state
                .request_id_seed
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            format!("req-{id:016x}")
        })
}

/// Attaches the request id to the response (and to the error body on
/// the failure path).
pub(crate) fn finish(request_id: &str, result: Result<Response, ApiError>) -> Response {
    let mut resp = match result {
        Ok(resp) => resp,
        Err(err) => {
            let status = StatusCode::from_u16(err.code.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let err = err.with_request_id(request_id);
            (status, Json(err)).into_response()
        }
    };
    if let Ok(value) = HeaderValue::from_str(request_id) {
        resp.headers_mut().insert("x-request-id", value);
    }
    resp
}

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| {
            headers
                .get("x-session-token")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        })
}

/// Authentication is checked before any authorization decision, so a
/// missing token is always 401 even on coordinator-only routes.
pub(crate) fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Requester, ApiError> {
    bearer_token(headers)
        .and_then(|token| state.sessions.resolve(token))
        .ok_or_else(ApiError::authentication_required)
}

pub(crate) fn require(
    requester: &Requester,
    resource: Resource,
    action: Action,
) -> Result<(), ApiError> {
    authorize(requester.capability, resource, action)
        .map_err(|denied| taskhive_api::denied_error(&denied))
}

/// Looks up the recipient's address and delivers. No address is a
/// no-op; a transport failure is logged at warn. Neither outcome
/// reaches the client.
pub(crate) async fn notify_best_effort(
    state: &AppState,
    recipient: Option<UserId>,
    subject: &str,
    body: String,
) {
    let Some(user_id) = recipient else {
        return;
    };
    let email = {
        let db = state.db.lock().await;
        match db.user_by_id(user_id) {
            Ok(user) => user.email,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "notification recipient lookup failed");
                return;
            }
        }
    };
    let Some(to) = email else {
        tracing::debug!(user_id, "notification skipped, no email on file");
        return;
    };
    let note = crate::notify::Notification {
        to,
        subject: subject.to_string(),
        body,
    };
    if let Err(e) = state.notifier.deliver(note).await {
        tracing::warn!(user_id, error = %e, "notification delivery failed");
    }
}

pub(crate) fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

pub(crate) fn created<T: serde::Serialize>(value: T) -> Response {
    (StatusCode::CREATED, Json(value)).into_response()
}

pub(crate) fn validation_error(errors: Vec<taskhive_api::FieldError>) -> ApiError {
    ApiError::validation_failed(serde_json::json!(errors))
}

pub(crate) fn body<T>(
    extracted: Result<Json<T>, axum::extract::rejection::JsonRejection>,
) -> Result<T, ApiError> {
    extracted
        .map(|Json(v)| v)
        .map_err(|e| ApiError::invalid_param("body", &e.to_string()))
}

pub(crate) fn path_id(
    extracted: Result<axum::extract::Path<i64>, axum::extract::rejection::PathRejection>,
) -> Result<i64, ApiError> {
    extracted
        .map(|axum::extract::Path(v)| v)
        .map_err(|_| ApiError::invalid_param("id", "not an integer"))
}
