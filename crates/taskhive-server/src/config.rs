// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub(crate) fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

pub(crate) fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

/// SMTP endpoint plus envelope sender; absent when mail is unconfigured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub relay: String,
    pub from: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// `None` runs against an in-memory database.
    pub db_path: Option<PathBuf>,
    pub session_ttl: Duration,
    pub smtp: Option<SmtpConfig>,
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            db_path: None,
            session_ttl: Duration::from_secs(8 * 3600),
            smtp: None,
            log_json: true,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let smtp = match (env::var("TASKHIVE_SMTP_RELAY"), env::var("TASKHIVE_SMTP_FROM")) {
            (Ok(relay), Ok(from)) if !relay.is_empty() && !from.is_empty() => {
                Some(SmtpConfig { relay, from })
            }
            _ => None,
        };
        Self {
            bind_addr: env::var("TASKHIVE_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            db_path: env::var("TASKHIVE_DB_PATH").ok().map(PathBuf::from),
            session_ttl: Duration::from_secs(env_u64("TASKHIVE_SESSION_TTL_SECS", 8 * 3600)),
            smtp,
            log_json: env_bool("TASKHIVE_LOG_JSON", true),
        }
    }
}
