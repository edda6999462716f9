// SPDX-License-Identifier: Apache-2.0

use super::{
    authenticate, body, created, finish, no_content, path_id, request_id, require,
    validation_error,
};
use crate::auth::hash_password;
use crate::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::collections::BTreeMap;
use taskhive_api::{
    parse_page, parse_volunteer_search, store_error, ApiError, VolunteerDetailResponse,
    VolunteerPayload,
};
use taskhive_model::Role;
use taskhive_policies::{Action, Resource};
use taskhive_store::{UserDraft, UserUpdate};

pub(crate) async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<BTreeMap<String, String>>,
) -> Response {
    let req_id = request_id(&headers, &state);
    let result: Result<Response, ApiError> = async {
        authenticate(&state, &headers)?;
        let search = parse_volunteer_search(&query);
        let page = parse_page(&query);
        let db = state.db.lock().await;
        let rows = db
            .list_volunteers(&search, page)
            .map_err(|e| store_error(&e))?;
        Ok(Json(rows).into_response())
    }
    .await;
    finish(&req_id, result)
}

pub(crate) async fn detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
) -> Response {
    let req_id = request_id(&headers, &state);
    let result: Result<Response, ApiError> = async {
        authenticate(&state, &headers)?;
        let id = path_id(path)?;
        let db = state.db.lock().await;
        let user = db.volunteer_by_id(id).map_err(|e| store_error(&e))?;
        let stats = db.volunteer_stats(id).map_err(|e| store_error(&e))?;
        Ok(Json(VolunteerDetailResponse { user, stats }).into_response())
    }
    .await;
    finish(&req_id, result)
}

pub(crate) async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<VolunteerPayload>, JsonRejection>,
) -> Response {
    let req_id = request_id(&headers, &state);
    let result: Result<Response, ApiError> = async {
        let requester = authenticate(&state, &headers)?;
        require(&requester, Resource::Volunteer, Action::Create)?;
        let payload = body(payload)?;
        let form = taskhive_api::validate_volunteer(&payload, true).map_err(validation_error)?;
        let plain = form.password.as_deref().unwrap_or_default();
        let password_hash = hash_password(plain).map_err(|e| {
            tracing::error!(error = %e, "password hashing failed");
            ApiError::internal()
        })?;
        let draft = UserDraft {
            username: form.username,
            password_hash,
            role: Role::Volunteer,
            first_name: form.first_name,
            last_name: form.last_name,
            email: form.email,
            phone: form.phone,
            city: form.city,
        };
        let db = state.db.lock().await;
        let user = db.create_user(&draft).map_err(|e| store_error(&e))?;
        tracing::info!(user_id = user.id, by = requester.user_id, "volunteer created");
        Ok(created(user))
    }
    .await;
    finish(&req_id, result)
}

pub(crate) async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<VolunteerPayload>, JsonRejection>,
) -> Response {
    let req_id = request_id(&headers, &state);
    let result: Result<Response, ApiError> = async {
        let requester = authenticate(&state, &headers)?;
        require(&requester, Resource::Volunteer, Action::Update)?;
        let id = path_id(path)?;
        let payload = body(payload)?;
        let form = taskhive_api::validate_volunteer(&payload, false).map_err(validation_error)?;
        let password_hash = match form.password.as_deref() {
            Some(plain) => Some(hash_password(plain).map_err(|e| {
                tracing::error!(error = %e, "password hashing failed");
                ApiError::internal()
            })?),
            None => None,
        };
        let update = UserUpdate {
            username: form.username,
            password_hash,
            role: Role::Volunteer,
            first_name: form.first_name,
            last_name: form.last_name,
            email: form.email,
            phone: form.phone,
            city: form.city,
        };
        let db = state.db.lock().await;
        // The route only addresses volunteers; a coordinator id is NotFound.
        db.volunteer_by_id(id).map_err(|e| store_error(&e))?;
        let user = db.update_user(id, &update).map_err(|e| store_error(&e))?;
        Ok(Json(user).into_response())
    }
    .await;
    finish(&req_id, result)
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
) -> Response {
    let req_id = request_id(&headers, &state);
    let result: Result<Response, ApiError> = async {
        let requester = authenticate(&state, &headers)?;
        require(&requester, Resource::Volunteer, Action::Delete)?;
        let id = path_id(path)?;
        {
            let db = state.db.lock().await;
            db.volunteer_by_id(id).map_err(|e| store_error(&e))?;
            db.delete_user(id).map_err(|e| store_error(&e))?;
        }
        state.sessions.revoke_user(id);
        tracing::info!(user_id = id, by = requester.user_id, "volunteer deleted");
        Ok(no_content())
    }
    .await;
    finish(&req_id, result)
}
