// SPDX-License-Identifier: Apache-2.0

use super::{
    authenticate, body, created, finish, no_content, notify_best_effort, path_id, request_id,
    require, validation_error,
};
use crate::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use std::collections::BTreeMap;
use taskhive_api::{
    parse_page, parse_report_search, store_error, ApiError, ReportCreatePayload,
    ReportUpdatePayload,
};
use taskhive_policies::{report_scope, Action, Resource};
use taskhive_store::ReportDraft;

pub(crate) async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<BTreeMap<String, String>>,
) -> Response {
    let req_id = request_id(&headers, &state);
    let result: Result<Response, ApiError> = async {
        let requester = authenticate(&state, &headers)?;
        let scope = report_scope(requester);
        let search = parse_report_search(&query);
        let page = parse_page(&query);
        let db = state.db.lock().await;
        let rows = db
            .list_reports(scope, &search, page)
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
        let requester = authenticate(&state, &headers)?;
        let scope = report_scope(requester);
        let id = path_id(path)?;
        let db = state.db.lock().await;
        let row = db.report_by_id(scope, id).map_err(|e| store_error(&e))?;
        Ok(Json(row).into_response())
    }
    .await;
    finish(&req_id, result)
}

/// Volunteer-only; any submitted author is discarded in favor of the
/// authenticated requester.
pub(crate) async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ReportCreatePayload>, JsonRejection>,
) -> Response {
    let req_id = request_id(&headers, &state);
    let result: Result<Response, ApiError> = async {
        let requester = authenticate(&state, &headers)?;
        require(&requester, Resource::Report, Action::Create)?;
        let payload = body(payload)?;
        let comment =
            taskhive_api::validate_report_comment(&payload.comment).map_err(validation_error)?;
        let draft = ReportDraft {
            comment,
            author: requester.user_id,
            task_id: payload.task_id,
        };
        let db = state.db.lock().await;
        let row = db
            .create_report(&draft, Utc::now())
            .map_err(|e| store_error(&e))?;
        tracing::info!(report_id = row.report.id, by = requester.user_id, "report filed");
        Ok(created(row))
    }
    .await;
    finish(&req_id, result)
}

pub(crate) async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ReportUpdatePayload>, JsonRejection>,
) -> Response {
    let req_id = request_id(&headers, &state);
    let result: Result<Response, ApiError> = async {
        let requester = authenticate(&state, &headers)?;
        require(&requester, Resource::Report, Action::Update)?;
        let id = path_id(path)?;
        let payload = body(payload)?;
        let comment =
            taskhive_api::validate_report_comment(&payload.comment).map_err(validation_error)?;
        let db = state.db.lock().await;
        let row = db
            .update_report(id, &comment, Utc::now())
            .map_err(|e| store_error(&e))?;
        Ok(Json(row).into_response())
    }
    .await;
    finish(&req_id, result)
}

/// Coordinator-only; verified_by and verified_at are forced to the
/// requester and current server time regardless of any submitted
/// values. The report author is notified afterwards.
pub(crate) async fn verify(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
) -> Response {
    let req_id = request_id(&headers, &state);
    let result: Result<Response, ApiError> = async {
        let requester = authenticate(&state, &headers)?;
        require(&requester, Resource::Report, Action::Update)?;
        let id = path_id(path)?;
        let row = {
            let db = state.db.lock().await;
            db.verify_report(id, requester.user_id, Utc::now())
                .map_err(|e| store_error(&e))?
        };
        notify_best_effort(
            &state,
            row.report.author,
            "Report verified",
            format!(
                "Your report on task \"{}\" has been verified.",
                row.task_title
            ),
        )
        .await;
        tracing::info!(report_id = id, by = requester.user_id, "report verified");
        Ok(Json(row).into_response())
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
        require(&requester, Resource::Report, Action::Delete)?;
        let id = path_id(path)?;
        let db = state.db.lock().await;
        db.delete_report(id).map_err(|e| store_error(&e))?;
        Ok(no_content())
    }
    .await;
    finish(&req_id, result)
}
