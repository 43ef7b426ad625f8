//! Core library for Digital Renaissance.
//!
//! Holds the state behind the marketing site: the editable content
//! [`Document`](document::Document) with its path-addressed update API, the
//! mock [`SessionStore`](session::SessionStore) with a substitutable
//! [`CredentialVerifier`](auth::CredentialVerifier), sign-in form validation,
//! and [`SiteState`](site::SiteState), which owns both stores and derives the
//! effective admin-mode flag. Durable state goes through the
//! `renaissance-storage` trait and nothing here touches the network.

pub mod auth;
pub mod content;
pub mod document;
pub mod error;
pub mod field;
pub mod form;
pub mod path;
pub mod session;
pub mod site;

pub use auth::{AuthRequest, CredentialVerifier, Credentials, DemoVerifier};
pub use content::{ContentExport, ContentStore, UnresolvedPathPolicy};
pub use document::Document;
pub use field::{FieldKind, FieldValue};
pub use form::{AuthMode, SignInForm};
pub use path::{ContentPath, PathStep};
pub use session::{Role, Session, SessionState, SessionStore};
pub use site::{FieldMode, SiteState};
