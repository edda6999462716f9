// SPDX-License-Identifier: Apache-2.0

use super::{authenticate, bearer_token, finish, no_content, request_id};
use crate::auth::verify_password;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use taskhive_api::{ApiError, ApiErrorCode, LoginPayload, LoginResponse};
use taskhive_policies::Capability;

fn bad_credentials() -> ApiError {
    ApiError::new(
        ApiErrorCode::AuthenticationRequired,
        "invalid username or password",
        serde_json::Value::Null,
    )
}

pub(crate) async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<LoginPayload>, JsonRejection>,
) -> Response {
    let req_id = request_id(&headers, &state);
    let result: Result<Response, ApiError> = async {
        let payload = super::body(payload)?;
        let (user, stored_hash) = {
            let db = state.db.lock().await;
            let user = db
                .user_by_username(&payload.username)
                .map_err(|e| taskhive_api::store_error(&e))?
                .ok_or_else(bad_credentials)?;
            let hash = db
                .password_hash(&payload.username)
                .map_err(|e| taskhive_api::store_error(&e))?
                .ok_or_else(bad_credentials)?;
            (user, hash)
        };
        if !verify_password(&payload.password, &stored_hash) {
            return Err(bad_credentials());
        }
        let token = state.sessions.issue(user.id, Capability::from(user.role));
        tracing::info!(user_id = user.id, "login");
        Ok(Json(LoginResponse { token, user }).into_response())
    }
    .await;
    finish(&req_id, result)
}

pub(crate) async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let req_id = request_id(&headers, &state);
    let result: Result<Response, ApiError> = async {
        let requester = authenticate(&state, &headers)?;
        if let Some(token) = bearer_token(&headers) {
            state.sessions.revoke(token);
        }
        tracing::info!(user_id = requester.user_id, "logout");
        Ok(no_content())
    }
    .await;
    finish(&req_id, result)
}

pub(crate) async fn healthz() -> Response {
    Json(serde_json::json!({"status": "ok"})).into_response()
}
