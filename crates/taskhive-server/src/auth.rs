// SPDX-License-Identifier: Apache-2.0

//! Password hashing and the in-memory session table. Tokens are opaque
//! uuid v4 strings with a fixed TTL; expired entries are purged lazily
//! on lookup.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use taskhive_model::UserId;
use taskhive_policies::{Capability, Requester};
use uuid::Uuid;

#[derive(Debug)]
pub struct AuthError(String);

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "auth error: {}", self.0)
    }
}

impl std::error::Error for AuthError {}

pub fn hash_password(plain: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError(e.to_string()))
}

/// A malformed stored hash verifies as false rather than erroring; the
/// caller cannot distinguish it from a wrong password.
#[must_use]
pub fn verify_password(plain: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(plain.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[derive(Debug, Clone)]
struct Session {
    user_id: UserId,
    capability: Capability,
    expires_at: Instant,
}

#[derive(Debug)]
pub struct SessionStore {
    ttl: Duration,
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Issues a fresh token for the user; prior tokens stay valid until
    /// they expire or are revoked.
    pub fn issue(&self, user_id: UserId, capability: Capability) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let session = Session {
            user_id,
            capability,
            expires_at: Instant::now() + self.ttl,
        };
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.retain(|_, s| s.expires_at > Instant::now());
            sessions.insert(token.clone(), session);
        }
        token
    }

    #[must_use]
    pub fn resolve(&self, token: &str) -> Option<Requester> {
        let mut sessions = self.sessions.lock().ok()?;
        match sessions.get(token) {
            Some(s) if s.expires_at > Instant::now() => {
                Some(Requester::new(s.user_id, s.capability))
            }
            Some(_) => {
                sessions.remove(token);
                None
            }
            None => None,
        }
    }

    pub fn revoke(&self, token: &str) {
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.remove(token);
        }
    }

    /// Drops every session belonging to the user, for account deletion.
    pub fn revoke_user(&self, user_id: UserId) {
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.retain(|_, s| s.user_id != user_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
        assert!(!verify_password("hunter2", "not-a-phc-string"));
    }

    #[test]
    fn tokens_resolve_until_revoked() {
        let store = SessionStore::new(Duration::from_secs(60));
        let token = store.issue(7, Capability::Volunteer);
        let requester = store.resolve(&token).unwrap();
        assert_eq!(requester.user_id, 7);
        assert_eq!(requester.capability, Capability::Volunteer);

        store.revoke(&token);
        assert!(store.resolve(&token).is_none());
    }

    #[test]
    fn expired_tokens_do_not_resolve() {
        let store = SessionStore::new(Duration::ZERO);
        let token = store.issue(7, Capability::Coordinator);
        assert!(store.resolve(&token).is_none());
    }

    #[test]
    fn revoke_user_drops_all_their_tokens() {
        let store = SessionStore::new(Duration::from_secs(60));
        let a = store.issue(7, Capability::Volunteer);
        let b = store.issue(7, Capability::Volunteer);
        let other = store.issue(8, Capability::Volunteer);
        store.revoke_user(7);
        assert!(store.resolve(&a).is_none());
        assert!(store.resolve(&b).is_none());
        assert!(store.resolve(&other).is_some());
    }
}
