use actix_web::cookie::{Cookie, SameSite};
use actix_web::HttpRequest;
use palpite_core::{IssuanceState, SessionState};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "palpite_session";

/// Sessions idle for longer than this are dropped on the next write
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(60 * 60);

struct Entry {
    state: SessionState,
    last_seen: Instant,
}

/// In-process session states keyed by the session cookie value.
/// Only sessions past `NoSet` are kept, and nothing survives a restart.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Entry>>,
    idle_ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_idle_ttl(DEFAULT_IDLE_TTL)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_ttl,
        }
    }

    /// Copy of the caller's state. Unknown or malformed cookies start a new
    /// session.
    pub fn checkout(&self, req: &HttpRequest) -> (String, SessionState) {
        let known_id = req
            .cookie(SESSION_COOKIE)
            .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
            .map(|id| id.to_string());

        match known_id {
            Some(id) => {
                let state = self.get(&id).unwrap_or_default();
                (id, state)
            }
            None => {
                let id = Uuid::new_v4().to_string();
                tracing::debug!("Starting session {}", id);
                (id, SessionState::default())
            }
        }
    }

    /// Writes the state back. A `NoSet` state removes the entry instead.
    pub fn store(&self, id: &str, state: SessionState) {
        let now = Instant::now();
        let mut sessions = self.sessions.write();

        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) <= self.idle_ttl);
        let expired = before - sessions.len();
        if expired > 0 {
            tracing::debug!("Dropped {} idle sessions", expired);
        }

        if state.state() == IssuanceState::NoSet {
            sessions.remove(id);
        } else {
            sessions.insert(
                id.to_string(),
                Entry {
                    state,
                    last_seen: now,
                },
            );
        }
    }

    pub fn remove(&self, id: &str) {
        self.sessions.write().remove(id);
    }

    /// Expired entries read as absent even before they are swept
    pub fn get(&self, id: &str) -> Option<SessionState> {
        self.sessions
            .read()
            .get(id)
            .filter(|entry| entry.last_seen.elapsed() <= self.idle_ttl)
            .map(|entry| entry.state.clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn session_cookie(id: &str) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, id.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn issued() -> SessionState {
        SessionState {
            number_set_id: Some("n1".to_string()),
            ..SessionState::default()
        }
    }

    #[test]
    fn test_checkout_without_cookie_starts_new_session() {
        let registry = SessionRegistry::new();
        let req = TestRequest::default().to_http_request();

        let (id, state) = registry.checkout(&req);
        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(state, SessionState::default());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_checkout_returns_stored_state() {
        let registry = SessionRegistry::new();
        let id = Uuid::new_v4().to_string();
        registry.store(&id, issued());

        let req = TestRequest::default()
            .cookie(session_cookie(&id))
            .to_http_request();
        let (checked_out_id, checked_out) = registry.checkout(&req);

        assert_eq!(checked_out_id, id);
        assert_eq!(checked_out, issued());
    }

    #[test]
    fn test_malformed_cookie_is_replaced() {
        let registry = SessionRegistry::new();
        let req = TestRequest::default()
            .cookie(Cookie::new(SESSION_COOKIE, "not-a-uuid"))
            .to_http_request();

        let (id, _) = registry.checkout(&req);
        assert_ne!(id, "not-a-uuid");
    }

    #[test]
    fn test_empty_states_are_not_kept() {
        let registry = SessionRegistry::new();

        for _ in 0..100 {
            registry.store(&Uuid::new_v4().to_string(), SessionState::default());
        }
        assert!(registry.is_empty());

        let id = Uuid::new_v4().to_string();
        registry.store(&id, issued());
        assert_eq!(registry.len(), 1);

        registry.store(&id, SessionState::default());
        assert!(registry.is_empty());
        assert!(registry.get(&id).is_none());
    }

    #[test]
    fn test_remove() {
        let registry = SessionRegistry::new();
        let id = Uuid::new_v4().to_string();
        registry.store(&id, issued());

        registry.remove(&id);
        assert!(registry.is_empty());
        registry.remove(&id);
    }

    #[test]
    fn test_idle_sessions_are_swept_on_store() {
        let registry = SessionRegistry::with_idle_ttl(Duration::from_millis(20));
        for _ in 0..10 {
            registry.store(&Uuid::new_v4().to_string(), issued());
        }
        assert_eq!(registry.len(), 10);

        std::thread::sleep(Duration::from_millis(50));

        let fresh = Uuid::new_v4().to_string();
        registry.store(&fresh, issued());
        assert_eq!(registry.len(), 1);
        assert!(registry.get(&fresh).is_some());
    }

    #[test]
    fn test_expired_session_reads_as_absent() {
        let registry = SessionRegistry::with_idle_ttl(Duration::from_millis(10));
        let id = Uuid::new_v4().to_string();
        registry.store(&id, issued());

        std::thread::sleep(Duration::from_millis(30));
        assert!(registry.get(&id).is_none());
    }
}
