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
use std::collections::BTreeMap;
use taskhive_api::{parse_page, parse_task_search, store_error, ApiError, TaskPayload};
use taskhive_model::{Task, UserId};
use taskhive_policies::{task_scope, Action, Resource, TaskScope};
use taskhive_store::TaskDraft;

fn assignment_note(task: &Task) -> String {
    let deadline = task
        .deadline
        .map(|d| format!(" (deadline {})", d.format("%Y-%m-%d %H:%M UTC")))
        .unwrap_or_default();
    format!("You have been assigned the task \"{}\"{deadline}.", task.title)
}

async fn notify_assignment(state: &AppState, task: &Task, assignee: Option<UserId>) {
    notify_best_effort(state, assignee, "New task assignment", assignment_note(task)).await;
}

pub(crate) async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<BTreeMap<String, String>>,
) -> Response {
    let req_id = request_id(&headers, &state);
    let result: Result<Response, ApiError> = async {
        let requester = authenticate(&state, &headers)?;
        let scope = task_scope(requester);
        let search = parse_task_search(&query);
        let page = parse_page(&query);
        let db = state.db.lock().await;
        let rows = db
            .list_tasks(scope, &search, page)
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
        let scope = task_scope(requester);
        let id = path_id(path)?;
        let db = state.db.lock().await;
        let detail = db.task_detail(scope, id).map_err(|e| store_error(&e))?;
        Ok(Json(detail).into_response())
    }
    .await;
    finish(&req_id, result)
}

pub(crate) async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> Response {
    let req_id = request_id(&headers, &state);
    let result: Result<Response, ApiError> = async {
        let requester = authenticate(&state, &headers)?;
        require(&requester, Resource::Task, Action::Create)?;
        let payload = body(payload)?;
        let form = taskhive_api::validate_task(&payload).map_err(validation_error)?;
        let draft = TaskDraft {
            title: form.title,
            description: form.description,
            created_by: requester.user_id,
            assigned_to: form.assigned_to,
            status: form.status,
            deadline: form.deadline,
            category_id: form.category_id,
            tag_ids: form.tag_ids,
        };
        let task = {
            let db = state.db.lock().await;
            db.create_task(&draft).map_err(|e| store_error(&e))?
        };
        if task.assigned_to.is_some() {
            notify_assignment(&state, &task, task.assigned_to).await;
        }
        tracing::info!(task_id = task.id, by = requester.user_id, "task created");
        Ok(created(task))
    }
    .await;
    finish(&req_id, result)
}

pub(crate) async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> Response {
    let req_id = request_id(&headers, &state);
    let result: Result<Response, ApiError> = async {
        let requester = authenticate(&state, &headers)?;
        require(&requester, Resource::Task, Action::Update)?;
        let id = path_id(path)?;
        let payload = body(payload)?;
        let form = taskhive_api::validate_task(&payload).map_err(validation_error)?;
        let outcome = {
            let db = state.db.lock().await;
            // The creator is immutable; carry the persisted value through.
            let prior = db
                .task_by_id(TaskScope::All, id)
                .map_err(|e| store_error(&e))?;
            let draft = TaskDraft {
                title: form.title,
                description: form.description,
                created_by: prior.created_by,
                assigned_to: form.assigned_to,
                status: form.status,
                deadline: form.deadline,
                category_id: form.category_id,
                tag_ids: form.tag_ids,
            };
            db.update_task(id, &draft).map_err(|e| store_error(&e))?
        };
        // Only a changed assignee is notified; resubmitting the same one
        // or clearing the field sends nothing.
        if outcome.assignee_changed {
            notify_assignment(&state, &outcome.task, outcome.task.assigned_to).await;
        }
        Ok(Json(outcome.task).into_response())
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
        require(&requester, Resource::Task, Action::Delete)?;
        let id = path_id(path)?;
        let db = state.db.lock().await;
        db.delete_task(id).map_err(|e| store_error(&e))?;
        tracing::info!(task_id = id, by = requester.user_id, "task deleted");
        Ok(no_content())
    }
    .await;
    finish(&req_id, result)
}
