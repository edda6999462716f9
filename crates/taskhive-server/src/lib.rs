#![forbid(unsafe_code)]
//! HTTP server for taskhive: session-authenticated JSON routes over the
//! role-scoped store, with best-effort SMTP notification on task
//! assignment and report verification.

mod auth;
mod config;
mod http;
mod notify;
mod state;
mod telemetry;

pub use auth::{hash_password, verify_password, SessionStore};
pub use config::{ServerConfig, SmtpConfig};
pub use notify::{
    ConsoleNotifier, FailingNotifier, Notification, Notifier, NotifyError, RecordingNotifier,
    SmtpNotifier,
};
pub use state::AppState;
pub use telemetry::init_tracing;

use axum::routing::{delete, get, post, put};
use axum::Router;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(http::dashboard::home))
        .route("/healthz", get(http::sessions::healthz))
        .route("/login", post(http::sessions::login))
        .route("/logout", post(http::sessions::logout))
        .route("/dashboard/coordinator", get(http::dashboard::coordinator))
        .route("/dashboard/volunteer", get(http::dashboard::volunteer))
        .route("/volunteers", get(http::volunteers::list))
        .route("/volunteers", post(http::volunteers::create))
        .route("/volunteers/{id}", get(http::volunteers::detail))
        .route("/volunteers/{id}", put(http::volunteers::update))
        .route("/volunteers/{id}", delete(http::volunteers::delete))
        .route("/categories", get(http::catalog::list_categories))
        .route("/categories", post(http::catalog::create_category))
        .route("/categories/{id}", get(http::catalog::category_detail))
        .route("/categories/{id}", put(http::catalog::update_category))
        .route("/categories/{id}", delete(http::catalog::delete_category))
        .route("/tags", get(http::catalog::list_tags))
        .route("/tags", post(http::catalog::create_tag))
        .route("/tags/{id}", get(http::catalog::tag_detail))
        .route("/tags/{id}", put(http::catalog::update_tag))
        .route("/tags/{id}", delete(http::catalog::delete_tag))
        .route("/tasks", get(http::tasks::list))
        .route("/tasks", post(http::tasks::create))
        .route("/tasks/{id}", get(http::tasks::detail))
        .route("/tasks/{id}", put(http::tasks::update))
        .route("/tasks/{id}", delete(http::tasks::delete))
        .route("/reports", get(http::reports::list))
        .route("/reports", post(http::reports::create))
        .route("/reports/{id}", get(http::reports::detail))
        .route("/reports/{id}", put(http::reports::update))
        .route("/reports/{id}", delete(http::reports::delete))
        .route("/reports/{id}/verify", post(http::reports::verify))
        .with_state(state)
}

pub const CRATE_NAME: &str = "taskhive-server";
