//! In-process session table.
//!
//! Sessions are opaque UUIDs handed out in a cookie after a completed
//! OAuth handshake. Pending OAuth `state` values live in the same table
//! so the callback can reject forged redirects. Both expire on a fixed
//! TTL; the background sweeper drops lapsed entries.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use dashmap::DashMap;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "tollgate_session";

/// Pending-state entries expire quickly; a handshake should not take long.
const STATE_TTL: Duration = Duration::from_secs(600);

/// An authenticated browser session.
#[derive(Debug, Clone)]
pub struct Session {
    pub owner_id: String,
    expires_at: Instant,
}

/// Session and OAuth-state table.
pub struct SessionStore {
    sessions: DashMap<String, Session>,
    pending_states: DashMap<String, Instant>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            pending_states: DashMap::new(),
            ttl,
        }
    }

    /// Create a session for an owner, returning its opaque id.
    pub fn create(&self, owner_id: impl Into<String>) -> String {
        let id = Uuid::new_v4().to_string();
        self.sessions.insert(
            id.clone(),
            Session {
                owner_id: owner_id.into(),
                expires_at: Instant::now() + self.ttl,
            },
        );
        id
    }

    /// Resolve a session id to its owner, dropping it if expired.
    pub fn resolve(&self, session_id: &str) -> Option<String> {
        let expired = match self.sessions.get(session_id) {
            Some(session) if session.expires_at > Instant::now() => {
                return Some(session.owner_id.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.sessions.remove(session_id);
        }
        None
    }

    /// Drop a session (logout). Idempotent.
    pub fn revoke(&self, session_id: &str) {
        self.sessions.remove(session_id);
    }

    /// Issue a fresh OAuth state value for an outgoing redirect.
    pub fn issue_state(&self) -> String {
        let state = Uuid::new_v4().to_string();
        self.pending_states
            .insert(state.clone(), Instant::now() + STATE_TTL);
        state
    }

    /// Consume a state value; returns false for unknown or expired states.
    pub fn consume_state(&self, state: &str) -> bool {
        match self.pending_states.remove(state) {
            Some((_, expires_at)) => expires_at > Instant::now(),
            None => false,
        }
    }

    /// Drop expired sessions and pending states.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.sessions.retain(|_, session| session.expires_at > now);
        self.pending_states.retain(|_, expires_at| *expires_at > now);
    }

    /// Owner id for the request's session cookie, if any.
    pub fn owner_from_headers(&self, headers: &HeaderMap) -> Option<String> {
        let session_id = session_id_from_headers(headers)?;
        self.resolve(&session_id)
    }
}

/// Pull the session id out of the `Cookie` header.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

/// `Set-Cookie` value establishing a session.
pub fn set_cookie_value(session_id: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE, session_id
    )
}

/// `Set-Cookie` value clearing the session cookie.
pub fn clear_cookie_value() -> String {
    format!("{}=; Path=/; HttpOnly; Max-Age=0", SESSION_COOKIE)
}
