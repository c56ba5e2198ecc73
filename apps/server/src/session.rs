//! # Login Sessions
//!
//! In-memory session table keyed by a random UUID v4.
//!
//! ## Lifecycle
//! ```text
//! POST /api/customers/login ──► create(principal) ──► "9b1d..." (X-Session-Id)
//!                                      │
//! any request with X-Session-Id ──► lookup(id)
//!                                      │   expired? remove, None
//!                                      │   live?    extend, Some(principal)
//!                                      ▼
//! POST /api/customers/logout ──► remove(id)
//!
//! sweep task (every sweep_interval) ──► drop all expired entries
//! ```
//!
//! Expiry is an idle timeout: each successful lookup pushes the deadline
//! forward by the full timeout.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use madang_core::Principal;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

/// Header carrying the session id in both directions.
pub const SESSION_HEADER: &str = "x-session-id";

#[derive(Debug, Clone)]
struct Session {
    principal: Principal,
    expires_at: Instant,
}

/// Thread-safe session table.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    timeout: Duration,
}

impl SessionStore {
    /// Creates an empty store whose sessions live for `timeout` after their
    /// last use.
    pub fn new(timeout: Duration) -> Self {
        SessionStore {
            sessions: RwLock::new(HashMap::new()),
            timeout,
        }
    }

    /// Starts a session and returns its id.
    pub async fn create(&self, principal: Principal) -> String {
        let id = Uuid::new_v4().to_string();
        let custid = principal.custid;
        let session = Session {
            principal,
            expires_at: Instant::now() + self.timeout,
        };
        self.sessions.write().await.insert(id.clone(), session);
        info!(custid, "Session created");
        id
    }

    /// Resolves a session id, extending its lifetime.
    ///
    /// Unknown and expired ids return `None`; expired entries are removed.
    pub async fn lookup(&self, id: &str) -> Option<Principal> {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        match sessions.get_mut(id) {
            Some(session) if session.expires_at > now => {
                session.expires_at = now + self.timeout;
                Some(session.principal.clone())
            }
            Some(_) => {
                sessions.remove(id);
                debug!("Expired session removed on lookup");
                None
            }
            None => None,
        }
    }

    /// Ends a session. Returns whether it existed.
    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Drops every expired session and returns how many were removed.
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at > now);
        before - sessions.len()
    }

    /// Number of stored sessions, expired or not.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Spawns the periodic sweep.
pub fn spawn_sweeper(store: Arc<SessionStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = store.sweep().await;
            if removed > 0 {
                info!(removed, "Expired sessions swept");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use madang_core::Role;

    fn principal(custid: i64) -> Principal {
        Principal {
            custid,
            name: format!("customer {custid}"),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.create(principal(3)).await;
        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(store.lookup(&id).await.unwrap().custid, 3);
        assert!(store.lookup("not-a-session").await.is_none());
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let store = SessionStore::new(Duration::from_secs(60));
        let a = store.create(principal(1)).await;
        let b = store.create(principal(1)).await;
        assert_ne!(a, b);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_expired_session_removed_on_lookup() {
        let store = SessionStore::new(Duration::ZERO);
        let id = store.create(principal(1)).await;
        assert!(store.lookup(&id).await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_sweep() {
        let store = SessionStore::new(Duration::ZERO);
        store.create(principal(1)).await;
        store.create(principal(2)).await;
        assert_eq!(store.sweep().await, 2);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_logout() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.create(principal(1)).await;
        assert!(store.remove(&id).await);
        assert!(!store.remove(&id).await);
        assert!(store.lookup(&id).await.is_none());
    }
}
