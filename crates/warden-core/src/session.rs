use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::AuthError;

/// One authenticated client instance.
///
/// Exactly one session row corresponds to one outstanding refresh-token
/// lineage: rotation updates this row's expiry in place, so invalidating
/// the session invalidates every token derived from it. Rows are never
/// deleted by the core — deactivated sessions are retained for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque unique id, embedded in both tokens of a pair as `sid`.
    pub id: String,

    /// The user who owns this session.
    pub user_id: String,

    pub issued_at: NaiveDateTime,

    /// Extended on each successful refresh.
    pub expires_at: NaiveDateTime,

    /// Flipped to `false` on logout, invalidation, or revocation.
    pub is_active: bool,

    /// Optional device or client description supplied at issuance.
    pub client_hint: Option<String>,
}

/// Partial update applied to a session row.
#[derive(Debug, Clone, Default)]
pub struct SessionPatch {
    pub expires_at: Option<NaiveDateTime>,
    pub is_active: Option<bool>,
}

/// Durable record of active sessions — the core's only external state.
///
/// Implementations must apply [`update`] as a single atomic
/// read-modify-write per session row (transactional update or optimistic
/// version check); concurrent refreshes of the same session would
/// otherwise lose a rotation or resurrect an invalidated session. Any
/// backend failure must surface as an error — the issuer fails closed on
/// it, never open.
///
/// [`update`]: SessionStore::update
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a new session, returning its id.
    async fn create(&self, session: Session) -> Result<String, AuthError>;

    /// Fetch a session by id.
    async fn get_by_id(&self, id: &str) -> Result<Option<Session>, AuthError>;

    /// Atomically apply a patch to one session row. Unknown ids are a
    /// no-op.
    async fn update(&self, id: &str, patch: SessionPatch) -> Result<(), AuthError>;

    /// All sessions belonging to a user, active or not.
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Session>, AuthError>;

    /// Flip `is_active` for every session belonging to a user.
    async fn set_active_for_user(&self, user_id: &str, active: bool) -> Result<(), AuthError>;
}

/// In-memory session store (good for development and testing).
///
/// The write lock makes each [`update`] an atomic read-modify-write,
/// satisfying the per-row serialization the trait requires.
///
/// [`update`]: SessionStore::update
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, session: Session) -> Result<String, AuthError> {
        let id = session.id.clone();
        self.sessions.write().await.insert(id.clone(), session);
        Ok(id)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Session>, AuthError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn update(&self, id: &str, patch: SessionPatch) -> Result<(), AuthError> {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(id) {
            if let Some(expires_at) = patch.expires_at {
                session.expires_at = expires_at;
            }
            if let Some(is_active) = patch.is_active {
                session.is_active = is_active;
            }
        }
        Ok(())
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Session>, AuthError> {
        Ok(self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn set_active_for_user(&self, user_id: &str, active: bool) -> Result<(), AuthError> {
        let mut sessions = self.sessions.write().await;
        for session in sessions.values_mut() {
            if session.user_id == user_id {
                session.is_active = active;
            }
        }
        Ok(())
    }
}
