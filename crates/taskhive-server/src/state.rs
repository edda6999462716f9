// SPDX-License-Identifier: Apache-2.0

use crate::auth::SessionStore;
use crate::notify::Notifier;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use taskhive_store::Db;
use tokio::sync::Mutex;

/// Shared handler state. The store is synchronous rusqlite behind an
/// async mutex; every store call happens under the lock and the lock is
/// never held across a notification await.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Db>>,
    pub sessions: Arc<SessionStore>,
    pub notifier: Arc<dyn Notifier>,
    pub request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    #[must_use]
    pub fn new(db: Db, sessions: SessionStore, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            sessions: Arc::new(sessions),
            notifier,
            request_id_seed: Arc::new(AtomicU64::new(1)),
        }
    }
}
