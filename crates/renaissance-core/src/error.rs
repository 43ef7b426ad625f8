//! Error types for `renaissance-core`.
//!
//! User-facing errors (form validation, malformed imports) leave every store
//! in its prior state. Contract errors (unresolved paths) point at a bug in
//! the caller.

use std::collections::BTreeMap;

use renaissance_storage::StorageError;

use crate::field::FieldKind;
use crate::form::FormField;

/// A path string that does not follow `field(.field|[index])*`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// The path is empty.
    #[error("content path is empty")]
    Empty,

    /// The path has a syntax error at the given byte offset.
    #[error("invalid content path '{path}' at offset {offset}")]
    Syntax { path: String, offset: usize },
}

/// Imported text that does not describe a complete, valid document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedContentError {
    /// Not JSON, or JSON of the wrong shape.
    #[error("malformed content at line {line}, column {column}: {reason}")]
    Syntax {
        reason: String,
        line: usize,
        column: usize,
    },

    /// Well-formed JSON holding a value the document does not allow.
    #[error("malformed content: {reason}")]
    Invalid { reason: String },
}

impl MalformedContentError {
    #[must_use]
    pub fn reason(&self) -> &str {
        match self {
            Self::Syntax { reason, .. } | Self::Invalid { reason } => reason,
        }
    }
}

impl From<serde_json::Error> for MalformedContentError {
    fn from(e: serde_json::Error) -> Self {
        Self::Syntax {
            reason: e.to_string(),
            line: e.line(),
            column: e.column(),
        }
    }
}

/// Errors from content store operations.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// The path text could not be parsed.
    #[error(transparent)]
    Path(#[from] PathError),

    /// The path is well formed but names nothing in the document.
    #[error("content path '{path}' does not resolve: {reason}")]
    UnresolvedPath { path: String, reason: String },

    /// The value's kind does not match the field at the path.
    #[error("content path '{path}' holds {expected}, got {actual}")]
    ValueMismatch {
        path: String,
        expected: FieldKind,
        actual: FieldKind,
    },

    /// A rating outside `0..=MAX_RATING`.
    #[error("rating {value} is out of range (max {max})")]
    RatingOutOfRange { value: u8, max: u8 },

    /// Imported text was rejected as a whole.
    #[error(transparent)]
    Malformed(#[from] MalformedContentError),

    /// The document could not be encoded.
    #[error("failed to encode content: {reason}")]
    Encode { reason: String },

    /// Durable storage failed while saving.
    #[error("content storage error: {0}")]
    Storage(#[from] StorageError),
}

/// The persisted session record at startup could not be parsed.
///
/// Recovered inside `SessionStore::restore` and never returned to callers.
#[derive(Debug, Clone, thiserror::Error)]
#[error("persisted session record is corrupt: {reason}")]
pub struct PersistedSessionCorrupt {
    pub reason: String,
}

/// Errors from a credential verifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The verifier refused the credentials.
    #[error("credentials rejected for '{username}'")]
    Rejected { username: String },

    /// The verifier could not reach its credential store.
    #[error("credential verifier unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Errors from session store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// A session is already active; sign out first.
    #[error("already signed in as '{username}'")]
    AlreadyAuthenticated { username: String },

    /// The credential verifier refused or failed.
    #[error(transparent)]
    Verifier(#[from] AuthError),
}

/// Field-level problems found while validating the sign-in form.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("sign-in form has {} invalid field(s)", .fields.len())]
pub struct ValidationErrors {
    pub fields: BTreeMap<FormField, String>,
}

impl ValidationErrors {
    /// Message reported for `field`, if any.
    #[must_use]
    pub fn get(&self, field: FormField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    /// Whether no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn insert(&mut self, field: FormField, message: &str) {
        self.fields.insert(field, message.to_owned());
    }
}

/// Errors from the site state facade.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// Inline edits need an admin session with edit mode on.
    #[error("content is not editable: admin mode is off")]
    NotEditable,

    /// The operation belongs to the admin panel.
    #[error("{operation} requires an admin session")]
    AdminRequired { operation: &'static str },

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Content(#[from] ContentError),
}
