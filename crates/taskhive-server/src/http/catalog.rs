// SPDX-License-Identifier: Apache-2.0

use super::{
    authenticate, body, created, finish, no_content, path_id, request_id, require,
    validation_error,
};
use crate::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::collections::BTreeMap;
use taskhive_api::{
    parse_category_search, parse_page, parse_tag_search, store_error, ApiError, CategoryPayload,
    TagPayload,
};
use taskhive_policies::{Action, Resource};

pub(crate) async fn list_categories(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<BTreeMap<String, String>>,
) -> Response {
    let req_id = request_id(&headers, &state);
    let result: Result<Response, ApiError> = async {
        authenticate(&state, &headers)?;
        let search = parse_category_search(&query);
        let page = parse_page(&query);
        let db = state.db.lock().await;
        let rows = db
            .list_categories(&search, page)
            .map_err(|e| store_error(&e))?;
        Ok(Json(rows).into_response())
    }
    .await;
    finish(&req_id, result)
}

pub(crate) async fn category_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
) -> Response {
    let req_id = request_id(&headers, &state);
    let result: Result<Response, ApiError> = async {
        authenticate(&state, &headers)?;
        let id = path_id(path)?;
        let db = state.db.lock().await;
        let category = db.category_by_id(id).map_err(|e| store_error(&e))?;
        Ok(Json(category).into_response())
    }
    .await;
    finish(&req_id, result)
}

pub(crate) async fn create_category(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CategoryPayload>, JsonRejection>,
) -> Response {
    let req_id = request_id(&headers, &state);
    let result: Result<Response, ApiError> = async {
        let requester = authenticate(&state, &headers)?;
        require(&requester, Resource::Category, Action::Create)?;
        let payload = body(payload)?;
        let draft = taskhive_api::validate_category(&payload).map_err(validation_error)?;
        let db = state.db.lock().await;
        let category = db.create_category(&draft).map_err(|e| store_error(&e))?;
        Ok(created(category))
    }
    .await;
    finish(&req_id, result)
}

pub(crate) async fn update_category(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CategoryPayload>, JsonRejection>,
) -> Response {
    let req_id = request_id(&headers, &state);
    let result: Result<Response, ApiError> = async {
        let requester = authenticate(&state, &headers)?;
        require(&requester, Resource::Category, Action::Update)?;
        let id = path_id(path)?;
        let payload = body(payload)?;
        let draft = taskhive_api::validate_category(&payload).map_err(validation_error)?;
        let db = state.db.lock().await;
        let category = db
            .update_category(id, &draft)
            .map_err(|e| store_error(&e))?;
        Ok(Json(category).into_response())
    }
    .await;
    finish(&req_id, result)
}

pub(crate) async fn delete_category(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
) -> Response {
    let req_id = request_id(&headers, &state);
    let result: Result<Response, ApiError> = async {
        let requester = authenticate(&state, &headers)?;
        require(&requester, Resource::Category, Action::Delete)?;
        let id = path_id(path)?;
        let db = state.db.lock().await;
        db.delete_category(id).map_err(|e| store_error(&e))?;
        Ok(no_content())
    }
    .await;
    finish(&req_id, result)
}

pub(crate) async fn list_tags(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<BTreeMap<String, String>>,
) -> Response {
    let req_id = request_id(&headers, &state);
    let result: Result<Response, ApiError> = async {
        authenticate(&state, &headers)?;
        let search = parse_tag_search(&query);
        let page = parse_page(&query);
        let db = state.db.lock().await;
        let rows = db.list_tags(&search, page).map_err(|e| store_error(&e))?;
        Ok(Json(rows).into_response())
    }
    .await;
    finish(&req_id, result)
}

pub(crate) async fn tag_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
) -> Response {
    let req_id = request_id(&headers, &state);
    let result: Result<Response, ApiError> = async {
        authenticate(&state, &headers)?;
        let id = path_id(path)?;
        let db = state.db.lock().await;
        let tag = db.tag_by_id(id).map_err(|e| store_error(&e))?;
        Ok(Json(tag).into_response())
    }
    .await;
    finish(&req_id, result)
}

pub(crate) async fn create_tag(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<TagPayload>, JsonRejection>,
) -> Response {
    let req_id = request_id(&headers, &state);
    let result: Result<Response, ApiError> = async {
        let requester = authenticate(&state, &headers)?;
        require(&requester, Resource::Tag, Action::Create)?;
        let payload = body(payload)?;
        let draft = taskhive_api::validate_tag(&payload).map_err(validation_error)?;
        let db = state.db.lock().await;
        let tag = db.create_tag(&draft).map_err(|e| store_error(&e))?;
        Ok(created(tag))
    }
    .await;
    finish(&req_id, result)
}

pub(crate) async fn update_tag(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<TagPayload>, JsonRejection>,
) -> Response {
    let req_id = request_id(&headers, &state);
    let result: Result<Response, ApiError> = async {
        let requester = authenticate(&state, &headers)?;
        require(&requester, Resource::Tag, Action::Update)?;
        let id = path_id(path)?;
        let payload = body(payload)?;
        let draft = taskhive_api::validate_tag(&payload).map_err(validation_error)?;
        let db = state.db.lock().await;
        let tag = db.update_tag(id, &draft).map_err(|e| store_error(&e))?;
        Ok(Json(tag).into_response())
    }
    .await;
    finish(&req_id, result)
}

pub(crate) async fn delete_tag(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
) -> Response {
    let req_id = request_id(&headers, &state);
    let result: Result<Response, ApiError> = async {
        let requester = authenticate(&state, &headers)?;
        require(&requester, Resource::Tag, Action::Delete)?;
        let id = path_id(path)?;
        let db = state.db.lock().await;
        db.delete_tag(id).map_err(|e| store_error(&e))?;
        Ok(no_content())
    }
    .await;
    finish(&req_id, result)
}
