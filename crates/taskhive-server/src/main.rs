#![forbid(unsafe_code)]

use std::sync::Arc;
use std::time::Duration;
use taskhive_server::{
    build_router, init_tracing, AppState, ConsoleNotifier, Notifier, ServerConfig, SessionStore,
    SmtpNotifier,
};
use taskhive_store::Db;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), String> {
    let config = ServerConfig::from_env();
    init_tracing(config.log_json);

    let db = match &config.db_path {
        Some(path) => Db::open(path).map_err(|e| format!("open {}: {e}", path.display()))?,
        None => {
            warn!("TASKHIVE_DB_PATH unset, using an in-memory database");
            Db::open_in_memory().map_err(|e| e.to_string())?
        }
    };

    let notifier: Arc<dyn Notifier> = match &config.smtp {
        Some(smtp) => {
            let notifier =
                SmtpNotifier::new(&smtp.relay, &smtp.from).map_err(|e| e.to_string())?;
            info!(relay = %smtp.relay, "smtp notifier configured");
            Arc::new(notifier)
        }
        None => {
            info!("smtp unconfigured, notifications go to the log");
            Arc::new(ConsoleNotifier)
        }
    };

    let sessions = SessionStore::new(config.session_ttl);
    let state = AppState::new(db, sessions, notifier);
    let app = build_router(state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .map_err(|e| format!("bind {}: {e}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| e.to_string())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    tracing::info!("shutdown signal received, draining");
    tokio::time::sleep(Duration::from_millis(50)).await;
}
