// SPDX-License-Identifier: Apache-2.0

use super::{authenticate, finish, request_id};
use crate::AppState;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use taskhive_api::ApiError;

fn coordinator_only() -> ApiError {
    ApiError::authorization_denied("coordinator role required")
}

/// Role dispatch for the landing route: each role gets its own
/// dashboard payload.
pub(crate) async fn home(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let req_id = request_id(&headers, &state);
    let result: Result<Response, ApiError> = async {
        let requester = authenticate(&state, &headers)?;
        let db = state.db.lock().await;
        if requester.capability.is_coordinator() {
            let summary = db
                .coordinator_summary()
                .map_err(|e| taskhive_api::store_error(&e))?;
            Ok(Json(serde_json::json!({"role": "coordinator", "summary": summary}))
                .into_response())
        } else {
            let user = db
                .user_by_id(requester.user_id)
                .map_err(|e| taskhive_api::store_error(&e))?;
            let summary = db
                .volunteer_summary(requester.user_id)
                .map_err(|e| taskhive_api::store_error(&e))?;
            Ok(
                Json(serde_json::json!({"role": "volunteer", "user": user, "summary": summary}))
                    .into_response(),
            )
        }
    }
    .await;
    finish(&req_id, result)
}

pub(crate) async fn coordinator(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let req_id = request_id(&headers, &state);
    let result: Result<Response, ApiError> = async {
        let requester = authenticate(&state, &headers)?;
        if !requester.capability.is_coordinator() {
            return Err(coordinator_only());
        }
        let db = state.db.lock().await;
        let summary = db
            .coordinator_summary()
            .map_err(|e| taskhive_api::store_error(&e))?;
        Ok(Json(summary).into_response())
    }
    .await;
    finish(&req_id, result)
}

pub(crate) async fn volunteer(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let req_id = request_id(&headers, &state);
    let result: Result<Response, ApiError> = async {
        let requester = authenticate(&state, &headers)?;
        let db = state.db.lock().await;
        let user = db
            .user_by_id(requester.user_id)
            .map_err(|e| taskhive_api::store_error(&e))?;
        let summary = db
            .volunteer_summary(requester.user_id)
            .map_err(|e| taskhive_api::store_error(&e))?;
        Ok(Json(serde_json::json!({"user": user, "summary": summary})).into_response())
    }
    .await;
    finish(&req_id, result)
}
