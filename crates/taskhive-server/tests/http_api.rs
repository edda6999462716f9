// SPDX-License-Identifier: Apache-2.0

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use taskhive_model::{Role, UserId, Username};
use taskhive_server::{
    build_router, hash_password, AppState, FailingNotifier, Notifier, RecordingNotifier,
    SessionStore,
};
use taskhive_store::{Db, UserDraft};
use tower::ServiceExt;

struct Harness {
    app: Router,
    state: AppState,
    notifier: Arc<RecordingNotifier>,
}

fn harness() -> Harness {
    let notifier = Arc::new(RecordingNotifier::default());
    let state = AppState::new(
        Db::open_in_memory().unwrap(),
        SessionStore::new(Duration::from_secs(3600)),
        notifier.clone(),
    );
    Harness {
        app: build_router(state.clone()),
        state,
        notifier,
    }
}

async fn seed_user(state: &AppState, username: &str, role: Role, email: Option<&str>) -> UserId {
    let db = state.db.lock().await;
    db.create_user(&UserDraft {
        username: Username::parse(username).unwrap(),
        password_hash: hash_password("hunter2").unwrap(),
        role,
        first_name: String::new(),
        last_name: String::new(),
        email: email.map(str::to_string),
        phone: None,
        city: String::new(),
    })
    .unwrap()
    .id
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn token_for(state: &AppState, user_id: UserId, role: Role) -> String {
    state.sessions.issue(user_id, role.into())
}

#[tokio::test]
async fn healthz_needs_no_token() {
    let h = harness();
    let (status, body) = send(&h.app, "GET", "/healthz", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn login_round_trip_and_bad_password() {
    let h = harness();
    seed_user(&h.state, "coord", Role::Coordinator, None).await;

    let (status, body) = send(
        &h.app,
        "POST",
        "/login",
        None,
        Some(json!({"username": "coord", "password": "hunter2"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(body["user"]["username"], "coord");

    let (status, _) = send(&h.app, "GET", "/dashboard/coordinator", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &h.app,
        "POST",
        "/login",
        None,
        Some(json!({"username": "coord", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "authentication_required");
}

#[tokio::test]
async fn missing_token_is_401_before_any_role_check() {
    let h = harness();
    let (status, body) = send(
        &h.app,
        "POST",
        "/tasks",
        None,
        Some(json!({"title": "mow"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "authentication_required");
    assert!(body["request_id"].as_str().unwrap().starts_with("req-"));
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let h = harness();
    let id = seed_user(&h.state, "coord", Role::Coordinator, None).await;
    let token = token_for(&h.state, id, Role::Coordinator);

    let (status, _) = send(&h.app, "POST", "/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&h.app, "GET", "/", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn volunteer_mutations_are_denied() {
    let h = harness();
    let id = seed_user(&h.state, "sam", Role::Volunteer, None).await;
    let token = token_for(&h.state, id, Role::Volunteer);

    let (status, body) = send(
        &h.app,
        "POST",
        "/categories",
        Some(&token),
        Some(json!({"name": "garden"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "authorization_denied");

    let (status, _) = send(&h.app, "GET", "/dashboard/coordinator", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn coordinator_cannot_file_reports() {
    let h = harness();
    let id = seed_user(&h.state, "coord", Role::Coordinator, None).await;
    let token = token_for(&h.state, id, Role::Coordinator);

    let (status, body) = send(
        &h.app,
        "POST",
        "/reports",
        Some(&token),
        Some(json!({"comment": "done", "task_id": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "authorization_denied");
}

#[tokio::test]
async fn volunteer_sees_only_assigned_tasks_and_gets_404_elsewhere() {
    let h = harness();
    let coord = seed_user(&h.state, "coord", Role::Coordinator, None).await;
    let sam = seed_user(&h.state, "sam", Role::Volunteer, None).await;
    let coord_token = token_for(&h.state, coord, Role::Coordinator);
    let sam_token = token_for(&h.state, sam, Role::Volunteer);

    let (status, mine) = send(
        &h.app,
        "POST",
        "/tasks",
        Some(&coord_token),
        Some(json!({"title": "mine", "assigned_to": sam})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, other) = send(
        &h.app,
        "POST",
        "/tasks",
        Some(&coord_token),
        Some(json!({"title": "unassigned"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, page) = send(&h.app, "GET", "/tasks", Some(&sam_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["rows"][0]["id"], mine["id"]);

    let uri = format!("/tasks/{}", other["id"]);
    let (status, body) = send(&h.app, "GET", &uri, Some(&sam_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    // The coordinator sees both.
    let (_, page) = send(&h.app, "GET", "/tasks", Some(&coord_token), None).await;
    assert_eq!(page["total"], 2);
}

#[tokio::test]
async fn report_author_is_forced_to_the_requester() {
    let h = harness();
    let coord = seed_user(&h.state, "coord", Role::Coordinator, None).await;
    let sam = seed_user(&h.state, "sam", Role::Volunteer, None).await;
    let coord_token = token_for(&h.state, coord, Role::Coordinator);
    let sam_token = token_for(&h.state, sam, Role::Volunteer);

    let (_, task) = send(
        &h.app,
        "POST",
        "/tasks",
        Some(&coord_token),
        Some(json!({"title": "mow", "assigned_to": sam})),
    )
    .await;

    let (status, report) = send(
        &h.app,
        "POST",
        "/reports",
        Some(&sam_token),
        Some(json!({"comment": "done", "task_id": task["id"], "author": 999})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(report["author"], sam);
    assert_eq!(report["task_title"], "mow");
}

#[tokio::test]
async fn report_against_someone_elses_task_is_rejected() {
    let h = harness();
    let coord = seed_user(&h.state, "coord", Role::Coordinator, None).await;
    let sam = seed_user(&h.state, "sam", Role::Volunteer, None).await;
    let kim = seed_user(&h.state, "kim", Role::Volunteer, None).await;
    let coord_token = token_for(&h.state, coord, Role::Coordinator);
    let kim_token = token_for(&h.state, kim, Role::Volunteer);

    let (_, task) = send(
        &h.app,
        "POST",
        "/tasks",
        Some(&coord_token),
        Some(json!({"title": "mow", "assigned_to": sam})),
    )
    .await;

    let (status, body) = send(
        &h.app,
        "POST",
        "/reports",
        Some(&kim_token),
        Some(json!({"comment": "done", "task_id": task["id"]})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "validation_failed");
    assert_eq!(body["details"]["field_errors"][0]["field"], "task_id");
}

#[tokio::test]
async fn verify_stamps_requester_and_notifies_author() {
    let h = harness();
    let coord = seed_user(&h.state, "coord", Role::Coordinator, None).await;
    let sam = seed_user(&h.state, "sam", Role::Volunteer, Some("sam@example.com")).await;
    let coord_token = token_for(&h.state, coord, Role::Coordinator);
    let sam_token = token_for(&h.state, sam, Role::Volunteer);

    let (_, task) = send(
        &h.app,
        "POST",
        "/tasks",
        Some(&coord_token),
        Some(json!({"title": "mow", "assigned_to": sam})),
    )
    .await;
    let (_, report) = send(
        &h.app,
        "POST",
        "/reports",
        Some(&sam_token),
        Some(json!({"comment": "done", "task_id": task["id"]})),
    )
    .await;

    let before = h.notifier.sent().len();
    let uri = format!("/reports/{}/verify", report["id"]);
    let (status, verified) = send(&h.app, "POST", &uri, Some(&coord_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verified["verified_by"], coord);
    assert!(verified["verified_at"].is_string());

    let sent = h.notifier.sent();
    assert_eq!(sent.len(), before + 1);
    assert_eq!(sent.last().unwrap().to, "sam@example.com");

    // A volunteer cannot verify.
    let (status, _) = send(&h.app, "POST", &uri, Some(&sam_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn assignment_notifications_fire_only_on_change() {
    let h = harness();
    let coord = seed_user(&h.state, "coord", Role::Coordinator, None).await;
    let sam = seed_user(&h.state, "sam", Role::Volunteer, Some("sam@example.com")).await;
    let coord_token = token_for(&h.state, coord, Role::Coordinator);

    let (_, task) = send(
        &h.app,
        "POST",
        "/tasks",
        Some(&coord_token),
        Some(json!({"title": "mow", "assigned_to": sam})),
    )
    .await;
    assert_eq!(h.notifier.sent().len(), 1);

    // Resubmitting the same assignee sends nothing.
    let uri = format!("/tasks/{}", task["id"]);
    let (status, _) = send(
        &h.app,
        "PUT",
        &uri,
        Some(&coord_token),
        Some(json!({"title": "mow again", "assigned_to": sam})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.notifier.sent().len(), 1);

    // Clearing the assignee sends nothing either.
    let (status, _) = send(
        &h.app,
        "PUT",
        &uri,
        Some(&coord_token),
        Some(json!({"title": "mow again"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.notifier.sent().len(), 1);

    // Reassigning notifies again.
    let (status, _) = send(
        &h.app,
        "PUT",
        &uri,
        Some(&coord_token),
        Some(json!({"title": "mow again", "assigned_to": sam})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.notifier.sent().len(), 2);
}

#[tokio::test]
async fn notifier_failure_never_fails_the_mutation() {
    let notifier: Arc<dyn Notifier> = Arc::new(FailingNotifier);
    let state = AppState::new(
        Db::open_in_memory().unwrap(),
        SessionStore::new(Duration::from_secs(3600)),
        notifier,
    );
    let app = build_router(state.clone());
    let coord = seed_user(&state, "coord", Role::Coordinator, None).await;
    let sam = seed_user(&state, "sam", Role::Volunteer, Some("sam@example.com")).await;
    let token = token_for(&state, coord, Role::Coordinator);

    let (status, _) = send(
        &app,
        "POST",
        "/tasks",
        Some(&token),
        Some(json!({"title": "mow", "assigned_to": sam})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn validation_errors_carry_field_details() {
    let h = harness();
    let coord = seed_user(&h.state, "coord", Role::Coordinator, None).await;
    let token = token_for(&h.state, coord, Role::Coordinator);

    let (status, body) = send(
        &h.app,
        "POST",
        "/categories",
        Some(&token),
        Some(json!({"name": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"]["field_errors"][0]["field"], "name");

    let (status, body) = send(
        &h.app,
        "POST",
        "/tasks",
        Some(&token),
        Some(json!({"title": "mow", "status": "paused"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"]["field_errors"][0]["field"], "status");
}

#[tokio::test]
async fn malformed_body_and_path_are_400() {
    let h = harness();
    let coord = seed_user(&h.state, "coord", Role::Coordinator, None).await;
    let token = token_for(&h.state, coord, Role::Coordinator);

    let request = Request::builder()
        .method("POST")
        .uri("/tags")
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = h.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, body) = send(&h.app, "GET", "/tasks/abc", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_parameter");
}

#[tokio::test]
async fn duplicate_tag_is_409() {
    let h = harness();
    let coord = seed_user(&h.state, "coord", Role::Coordinator, None).await;
    let token = token_for(&h.state, coord, Role::Coordinator);

    let (status, _) = send(
        &h.app,
        "POST",
        "/tags",
        Some(&token),
        Some(json!({"name": "urgent"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(
        &h.app,
        "POST",
        "/tags",
        Some(&token),
        Some(json!({"name": "urgent"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");
}

#[tokio::test]
async fn volunteer_crud_and_detail_stats() {
    let h = harness();
    let coord = seed_user(&h.state, "coord", Role::Coordinator, None).await;
    let token = token_for(&h.state, coord, Role::Coordinator);

    let (status, sam) = send(
        &h.app,
        "POST",
        "/volunteers",
        Some(&token),
        Some(json!({"username": "sam", "password": "hunter2", "city": "Springfield"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sam["role"], "volunteer");

    let uri = format!("/volunteers/{}", sam["id"]);
    let (status, detail) = send(&h.app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["user"]["username"], "sam");
    assert_eq!(detail["stats"]["tasks_count"], 0);

    // The coordinator is not addressable through the volunteer routes.
    let uri = format!("/volunteers/{coord}");
    let (status, _) = send(&h.app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/volunteers/{}", sam["id"]);
    let (status, _) = send(&h.app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&h.app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn home_dispatches_by_role() {
    let h = harness();
    let coord = seed_user(&h.state, "coord", Role::Coordinator, None).await;
    let sam = seed_user(&h.state, "sam", Role::Volunteer, None).await;

    let coord_token = token_for(&h.state, coord, Role::Coordinator);
    let (status, body) = send(&h.app, "GET", "/", Some(&coord_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "coordinator");
    assert_eq!(body["summary"]["num_volunteers"], 1);

    let sam_token = token_for(&h.state, sam, Role::Volunteer);
    let (status, body) = send(&h.app, "GET", "/", Some(&sam_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "volunteer");
    assert_eq!(body["user"]["username"], "sam");
}

#[tokio::test]
async fn request_id_header_is_echoed() {
    let h = harness();
    let request = Request::builder()
        .method("GET")
        .uri("/")
        .header("x-request-id", "req-test-7")
        .body(Body::empty())
        .unwrap();
    let response = h.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "req-test-7"
    );
}
