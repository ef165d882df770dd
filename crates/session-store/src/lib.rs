//! Identity snapshot store for the Driftline client.
//!
//! Holds the current authentication identity and its readiness, fed by the
//! gateway's identity-change stream. Every other store reads it; the only
//! mutator is the subscription itself. The store never performs I/O.

use content_gateway::{AuthSession, AuthUser, Authenticator};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Capacity of the snapshot broadcast channel.
const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Immutable view of the current identity.
#[derive(Debug, Clone, Default)]
pub struct IdentitySnapshot {
    /// The raw session, when signed in.
    pub session: Option<AuthSession>,
    /// False until the first identity resolution completes; never reverts.
    pub ready: bool,
}

impl IdentitySnapshot {
    /// The signed-in user, derived from the session.
    pub fn user(&self) -> Option<&AuthUser> {
        self.session.as_ref().map(|s| &s.user)
    }

    /// User and access token together, when signed in.
    pub fn credentials(&self) -> Option<(&AuthUser, &str)> {
        self.session.as_ref().map(|s| (&s.user, s.access_token.as_str()))
    }
}

/// Store holding the identity snapshot shared by every cache.
pub struct SessionStore {
    state: Mutex<IdentitySnapshot>,
    changes: broadcast::Sender<IdentitySnapshot>,
}

impl SessionStore {
    /// Create a new store. Not ready until the first identity resolution.
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            state: Mutex::new(IdentitySnapshot::default()),
            changes,
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> IdentitySnapshot {
        self.state.lock().unwrap().clone()
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<AuthUser> {
        self.state.lock().unwrap().user().cloned()
    }

    /// Whether the first identity resolution has completed.
    pub fn ready(&self) -> bool {
        self.state.lock().unwrap().ready
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> broadcast::Receiver<IdentitySnapshot> {
        self.changes.subscribe()
    }

    /// Apply an identity-change event.
    ///
    /// Total and idempotent: any input (including `None`) produces a new
    /// snapshot and latches `ready`. Invoked by the identity subscription on
    /// the initial resolution, sign-in, sign-out, and token refresh.
    pub fn set_identity(&self, session: Option<AuthSession>) {
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            state.session = session;
            state.ready = true;
            state.clone()
        };
        debug!(signed_in = snapshot.session.is_some(), "Identity updated");
        let _ = self.changes.send(snapshot);
    }

    /// Wire the store to the gateway's identity-change stream.
    ///
    /// Seeds the store from the current session, so `ready` resolves even
    /// when no event ever fires (an unconfigured or unavailable stream
    /// degrades to `ready = true, user = None` instead of hanging gated
    /// consumers), then forwards events until the stream closes.
    pub fn attach(self: &Arc<Self>, authenticator: Arc<Authenticator>) -> JoinHandle<()> {
        let store = Arc::clone(self);
        let mut events = authenticator.subscribe();
        store.set_identity(authenticator.current_session());
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(session) => store.set_identity(session),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Identity stream lagged; resynchronizing");
                        store.set_identity(authenticator.current_session());
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Identity stream closed");
                        break;
                    }
                }
            }
        })
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn session(user_id: &str, email: Option<&str>) -> AuthSession {
        AuthSession {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
            user: AuthUser {
                id: user_id.to_string(),
                email: email.map(|e| e.to_string()),
            },
        }
    }

    #[test]
    fn starts_unready_and_signed_out() {
        let store = SessionStore::new();
        assert!(!store.ready());
        assert!(store.user().is_none());
    }

    #[test]
    fn set_identity_latches_ready() {
        let store = SessionStore::new();
        store.set_identity(None);
        assert!(store.ready());
        assert!(store.user().is_none());

        store.set_identity(Some(session("user-1", Some("alice@example.com"))));
        assert_eq!(store.user().unwrap().id, "user-1");

        // Sign-out keeps the store ready.
        store.set_identity(None);
        assert!(store.ready());
        assert!(store.user().is_none());
    }

    #[test]
    fn credentials_expose_user_and_token() {
        let store = SessionStore::new();
        store.set_identity(Some(session("user-1", None)));
        let snapshot = store.snapshot();
        let (user, token) = snapshot.credentials().unwrap();
        assert_eq!(user.id, "user-1");
        assert_eq!(token, "access");
    }

    #[tokio::test]
    async fn subscribers_see_identity_changes() {
        let store = SessionStore::new();
        let mut changes = store.subscribe();
        store.set_identity(Some(session("user-1", None)));
        let snapshot = changes.recv().await.unwrap();
        assert!(snapshot.ready);
        assert_eq!(snapshot.user().unwrap().id, "user-1");
    }

    #[tokio::test]
    async fn attach_resolves_ready_without_configuration() {
        let store = Arc::new(SessionStore::new());
        let authenticator = Arc::new(Authenticator::new(None));
        let handle = store.attach(Arc::clone(&authenticator));

        // Seeded synchronously from the (absent) current session.
        assert!(store.ready());
        assert!(store.user().is_none());
        handle.abort();
    }

    #[tokio::test]
    async fn attach_forwards_identity_events() {
        let store = Arc::new(SessionStore::new());
        let authenticator = Arc::new(Authenticator::new(None));
        let handle = store.attach(Arc::clone(&authenticator));

        let mut changes = store.subscribe();
        authenticator.restore_session(session("user-2", Some("bob@example.com")));
        let snapshot = changes.recv().await.unwrap();
        assert_eq!(snapshot.user().unwrap().id, "user-2");
        handle.abort();
    }
}
