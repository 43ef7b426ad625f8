//! Credential verification.
//!
//! The session store never decides who is an admin. It hands a validated
//! [`AuthRequest`] to a [`CredentialVerifier`] and adopts whatever session
//! comes back. [`DemoVerifier`] is the placeholder shipped with the site:
//! one fixed admin credential, every other sign-in is a client. A real
//! deployment swaps in a verifier backed by an actual credential store.

use std::fmt;

use crate::error::AuthError;
use crate::session::{Role, Session};

/// Username accepted by [`DemoVerifier`] as the site administrator.
pub const DEMO_ADMIN_USERNAME: &str = "Admin";

/// Password paired with [`DEMO_ADMIN_USERNAME`].
pub const DEMO_ADMIN_PASSWORD: &str = "admin123";

/// A username and password pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Registration details collected by the sign-up form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub email: String,
    pub full_name: String,
    pub company: Option<String>,
}

/// A sign-in attempt that has passed form validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRequest {
    /// Sign in to an existing account.
    Login { credentials: Credentials },
    /// Register a new account with the requested role.
    SignUp {
        credentials: Credentials,
        profile: Profile,
        role: Role,
    },
}

impl AuthRequest {
    /// Shorthand for a plain login.
    #[must_use]
    pub fn login(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Login {
            credentials: Credentials::new(username, password),
        }
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        match self {
            Self::Login { credentials } | Self::SignUp { credentials, .. } => credentials,
        }
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.credentials().username
    }
}

/// Turns a sign-in attempt into a session.
#[async_trait::async_trait]
pub trait CredentialVerifier: Send + Sync + 'static {
    /// Decide which session, if any, the request earns.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Rejected`] for bad credentials and
    /// [`AuthError::Unavailable`] when the credential store cannot be
    /// consulted.
    async fn verify(&self, request: &AuthRequest) -> Result<Session, AuthError>;
}

/// Placeholder verifier. Accepts everything; only the fixed admin pair
/// yields an admin login.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoVerifier;

#[async_trait::async_trait]
impl CredentialVerifier for DemoVerifier {
    async fn verify(&self, request: &AuthRequest) -> Result<Session, AuthError> {
        let session = match request {
            AuthRequest::Login { credentials }
                if credentials.username == DEMO_ADMIN_USERNAME
                    && credentials.password == DEMO_ADMIN_PASSWORD =>
            {
                Session::new(DEMO_ADMIN_USERNAME, Role::Admin)
            }
            AuthRequest::Login { credentials } => {
                Session::new(credentials.username.clone(), Role::Client)
            }
            AuthRequest::SignUp {
                credentials, role, ..
            } => Session::new(credentials.username.clone(), *role),
        };
        Ok(session)
    }
}
