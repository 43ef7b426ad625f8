//! Session store.
//!
//! Holds the signed-in identity and mirrors it to client storage so it
//! survives a reload. The lifecycle is:
//!
//! 1. **Restore**: at startup, read the persisted record. A record that does
//!    not parse is deleted and the session starts anonymous.
//! 2. **Login**: a validated request goes through the
//!    [`CredentialVerifier`]; the resulting session is adopted and persisted.
//! 3. **Logout**: clear the session and delete the record.
//!
//! Client and admin never switch into each other without a logout between.

use std::fmt;
use std::sync::Arc;

use renaissance_storage::ClientStorage;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::auth::{AuthRequest, CredentialVerifier};
use crate::error::{PersistedSessionCorrupt, SessionError};

/// Storage key for the persisted session record.
pub const SESSION_KEY: &str = "renaissance/session";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Client => "client",
            Self::Admin => "admin",
        })
    }
}

/// An authenticated identity. Also the persisted record's shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub role: Role,
}

impl Session {
    #[must_use]
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Where the session state machine currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Client,
    Admin,
}

impl SessionState {
    fn of(session: Option<&Session>) -> Self {
        match session.map(|s| s.role) {
            None => Self::Anonymous,
            Some(Role::Client) => Self::Client,
            Some(Role::Admin) => Self::Admin,
        }
    }
}

/// Owns the current session and keeps client storage in step with it.
pub struct SessionStore {
    storage: Arc<dyn ClientStorage>,
    verifier: Arc<dyn CredentialVerifier>,
    current: watch::Sender<Option<Session>>,
}

impl SessionStore {
    /// Create an anonymous store. Call [`restore`](Self::restore) to pick up
    /// a persisted session.
    #[must_use]
    pub fn new(storage: Arc<dyn ClientStorage>, verifier: Arc<dyn CredentialVerifier>) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            storage,
            verifier,
            current,
        }
    }

    /// Adopt the persisted session, if any.
    ///
    /// A corrupt record is deleted and the store stays anonymous. Nothing is
    /// reported to the caller; the problem is logged.
    pub async fn restore(&mut self) {
        let restored = match self.storage.get(SESSION_KEY).await {
            Ok(Some(bytes)) => match parse_record(&bytes) {
                Ok(session) => Some(session),
                Err(corrupt) => {
                    warn!(error = %corrupt, "discarding persisted session");
                    if let Err(e) = self.storage.delete(SESSION_KEY).await {
                        warn!(error = %e, "failed to delete corrupt session record");
                    }
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "failed to read persisted session");
                None
            }
        };

        if let Some(session) = &restored {
            info!(username = %session.username, role = %session.role, "session restored");
        }
        self.current.send_replace(restored);
    }

    /// Sign in and persist the resulting session.
    ///
    /// A storage failure while persisting is logged; the session is still
    /// active for this page.
    ///
    /// # Errors
    ///
    /// - [`SessionError::AlreadyAuthenticated`] if someone is signed in.
    /// - [`SessionError::Verifier`] if the verifier refuses.
    pub async fn login(&mut self, request: &AuthRequest) -> Result<Session, SessionError> {
        if let Some(active) = self.current.borrow().as_ref() {
            return Err(SessionError::AlreadyAuthenticated {
                username: active.username.clone(),
            });
        }

        let session = self.verifier.verify(request).await?;

        match serde_json::to_vec(&session) {
            Ok(record) => {
                if let Err(e) = self.storage.put(SESSION_KEY, &record).await {
                    warn!(error = %e, "failed to persist session");
                }
            }
            Err(e) => warn!(error = %e, "failed to encode session record"),
        }

        info!(username = %session.username, role = %session.role, "signed in");
        self.current.send_replace(Some(session.clone()));
        Ok(session)
    }

    /// Sign out and delete the persisted record. Always succeeds.
    pub async fn logout(&mut self) {
        if let Some(previous) = self.current.send_replace(None) {
            info!(username = %previous.username, "signed out");
        }
        if let Err(e) = self.storage.delete(SESSION_KEY).await {
            warn!(error = %e, "failed to delete persisted session");
        }
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.current.borrow().clone()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        SessionState::of(self.current.borrow().as_ref())
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state() != SessionState::Anonymous
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.state() == SessionState::Admin
    }

    #[must_use]
    pub fn is_client(&self) -> bool {
        self.state() == SessionState::Client
    }

    /// Watch for session changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.current.subscribe()
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

fn parse_record(bytes: &[u8]) -> Result<Session, PersistedSessionCorrupt> {
    let session: Session = serde_json::from_slice(bytes).map_err(|e| PersistedSessionCorrupt {
        reason: e.to_string(),
    })?;
    if session.username.trim().is_empty() {
        return Err(PersistedSessionCorrupt {
            reason: "username is empty".to_owned(),
        });
    }
    Ok(session)
}
