//! Content store.
//!
//! Owns the editable [`Document`], the edit-mode flag, and the saved
//! baseline. Updates are path-addressed; a path is fully resolved before
//! anything is written, so a bad path never leaves a half-applied edit.
//!
//! The current document lives in a `watch` channel: the sender is the source
//! of truth and every effective change wakes subscribers.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use renaissance_storage::ClientStorage;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::document::{Document, MAX_RATING};
use crate::error::ContentError;
use crate::field::{FieldValue, Node, Refusal};
use crate::path::ContentPath;

/// Storage key for the saved document.
pub const CONTENT_KEY: &str = "renaissance/content";

/// What `update` does when a path names nothing in the document.
///
/// A non-resolving path is a bug in the caller. Development builds surface
/// it; production builds log it and keep the page working.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedPathPolicy {
    /// Log at `warn` and report success.
    Ignore,
    /// Log at `error` and return [`ContentError::UnresolvedPath`].
    Fail,
}

impl Default for UnresolvedPathPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Fail
        } else {
            Self::Ignore
        }
    }
}

/// A serialized document ready to be offered as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentExport {
    /// Suggested file name, e.g. `renaissance-content-2025-03-01.json`.
    pub file_name: String,
    /// Pretty-printed JSON.
    pub contents: String,
}

/// Owns the document and its persistence.
pub struct ContentStore {
    storage: Arc<dyn ClientStorage>,
    policy: UnresolvedPathPolicy,
    document: watch::Sender<Document>,
    baseline: Document,
    edit_mode: bool,
}

impl ContentStore {
    /// Start from the seed document without touching storage.
    #[must_use]
    pub fn new(storage: Arc<dyn ClientStorage>, policy: UnresolvedPathPolicy) -> Self {
        Self::with_document(storage, policy, Document::seed())
    }

    /// Start from the saved document, falling back to the seed when nothing
    /// was saved or the saved record is unreadable.
    pub async fn load(storage: Arc<dyn ClientStorage>, policy: UnresolvedPathPolicy) -> Self {
        let document = match storage.get(CONTENT_KEY).await {
            Ok(Some(bytes)) => match std::str::from_utf8(&bytes)
                .map_err(|e| e.to_string())
                .and_then(|text| Document::from_json(text).map_err(|e| e.to_string()))
            {
                Ok(document) => document,
                Err(reason) => {
                    warn!(%reason, "saved content is unreadable, using seed content");
                    Document::seed()
                }
            },
            Ok(None) => Document::seed(),
            Err(e) => {
                warn!(error = %e, "failed to read saved content, using seed content");
                Document::seed()
            }
        };
        Self::with_document(storage, policy, document)
    }

    fn with_document(
        storage: Arc<dyn ClientStorage>,
        policy: UnresolvedPathPolicy,
        document: Document,
    ) -> Self {
        let (sender, _) = watch::channel(document.clone());
        Self {
            storage,
            policy,
            document: sender,
            baseline: document,
            edit_mode: false,
        }
    }

    /// Snapshot of the current document.
    #[must_use]
    pub fn get(&self) -> Document {
        self.document.borrow().clone()
    }

    /// Read the value at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::UnresolvedPath`] regardless of policy; reads
    /// have nothing to fall back to.
    pub fn read(&self, path: &ContentPath) -> Result<FieldValue, ContentError> {
        self.document
            .borrow()
            .locate(path.steps())
            .map(|found| found.to_value())
            .map_err(|miss| ContentError::UnresolvedPath {
                path: path.to_string(),
                reason: miss.to_string(),
            })
    }

    /// Replace the value at `path`, leaving every other field alone.
    ///
    /// # Errors
    ///
    /// - [`ContentError::UnresolvedPath`] under [`UnresolvedPathPolicy::Fail`].
    /// - [`ContentError::ValueMismatch`] if `value` has the wrong kind.
    /// - [`ContentError::RatingOutOfRange`] for ratings above the maximum.
    pub fn update(&mut self, path: &ContentPath, value: FieldValue) -> Result<(), ContentError> {
        let mut outcome = Ok(());
        let changed = self.document.send_if_modified(|document| {
            let slot = match document.locate_mut(path.steps()) {
                Ok(slot) => slot,
                Err(miss) => {
                    outcome = Err(ContentError::UnresolvedPath {
                        path: path.to_string(),
                        reason: miss.to_string(),
                    });
                    return false;
                }
            };
            match slot.assign(value) {
                Ok(changed) => changed,
                Err(Refusal::Mismatch { expected, actual }) => {
                    outcome = Err(ContentError::ValueMismatch {
                        path: path.to_string(),
                        expected,
                        actual,
                    });
                    false
                }
                Err(Refusal::RatingOutOfRange { value }) => {
                    outcome = Err(ContentError::RatingOutOfRange {
                        value,
                        max: MAX_RATING,
                    });
                    false
                }
            }
        });

        match outcome {
            Err(ContentError::UnresolvedPath { path, reason }) => match self.policy {
                UnresolvedPathPolicy::Ignore => {
                    warn!(%path, %reason, "ignoring update to unresolved content path");
                    Ok(())
                }
                UnresolvedPathPolicy::Fail => {
                    error!(%path, %reason, "update to unresolved content path");
                    Err(ContentError::UnresolvedPath { path, reason })
                }
            },
            Err(e) => Err(e),
            Ok(()) => {
                debug!(%path, changed, "content updated");
                Ok(())
            }
        }
    }

    /// Parse `path` and update.
    ///
    /// # Errors
    ///
    /// [`ContentError::Path`] for syntax errors, otherwise as
    /// [`update`](Self::update).
    pub fn update_str(
        &mut self,
        path: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), ContentError> {
        let path = ContentPath::parse(path)?;
        self.update(&path, value.into())
    }

    /// Persist the current document as the new baseline.
    ///
    /// # Errors
    ///
    /// [`ContentError::Storage`] if the write fails; the baseline is left as
    /// it was.
    pub async fn save(&mut self) -> Result<(), ContentError> {
        let document = self.get();
        let bytes = serde_json::to_vec(&document).map_err(|e| ContentError::Encode {
            reason: e.to_string(),
        })?;
        self.storage.put(CONTENT_KEY, &bytes).await?;
        info!(bytes = bytes.len(), "content saved");
        self.baseline = document;
        Ok(())
    }

    /// Whether the document differs from the last saved or loaded one.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        *self.document.borrow() != self.baseline
    }

    /// Throw away unsaved changes.
    pub fn revert(&mut self) {
        let baseline = self.baseline.clone();
        self.document.send_if_modified(|document| {
            if *document == baseline {
                false
            } else {
                *document = baseline;
                true
            }
        });
    }

    /// Serialize the document for download.
    ///
    /// # Errors
    ///
    /// [`ContentError::Encode`] if serialization fails.
    pub fn export(&self) -> Result<ContentExport, ContentError> {
        let contents = self
            .document
            .borrow()
            .to_json_pretty()
            .map_err(|e| ContentError::Encode {
                reason: e.to_string(),
            })?;
        Ok(ContentExport {
            file_name: format!("renaissance-content-{}.json", Utc::now().format("%Y-%m-%d")),
            contents,
        })
    }

    /// Replace the whole document with one parsed from `text`.
    ///
    /// Does not save; the admin saves explicitly.
    ///
    /// # Errors
    ///
    /// [`ContentError::Malformed`] if the text is not a complete document.
    /// The current document is untouched in that case.
    pub fn import(&mut self, text: &str) -> Result<(), ContentError> {
        let incoming = Document::from_json(text).inspect_err(|e| {
            warn!(error = %e, "rejected content import");
        })?;
        let replaced = self.document.send_if_modified(|document| {
            if *document == incoming {
                false
            } else {
                *document = incoming;
                true
            }
        });
        info!(replaced, "content imported");
        Ok(())
    }

    /// Flip the edit-mode flag. Only admins see any effect.
    pub fn toggle_admin_mode(&mut self) {
        self.edit_mode = !self.edit_mode;
        debug!(edit_mode = self.edit_mode, "edit mode toggled");
    }

    /// Force the edit-mode flag.
    pub fn set_edit_mode(&mut self, on: bool) {
        self.edit_mode = on;
    }

    /// The raw flag. Consumers must combine it with the session role; see
    /// `SiteState::admin_mode`.
    #[must_use]
    pub fn edit_mode_requested(&self) -> bool {
        self.edit_mode
    }

    #[must_use]
    pub fn policy(&self) -> UnresolvedPathPolicy {
        self.policy
    }

    /// Watch for document changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Document> {
        self.document.subscribe()
    }
}

impl fmt::Debug for ContentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentStore")
            .field("policy", &self.policy)
            .field("edit_mode", &self.edit_mode)
            .field("unsaved", &self.has_unsaved_changes())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use renaissance_storage::MemoryStorage;

    fn store(policy: UnresolvedPathPolicy) -> ContentStore {
        ContentStore::new(Arc::new(MemoryStorage::new()), policy)
    }

    fn path(text: &str) -> ContentPath {
        ContentPath::parse(text).unwrap()
    }

    #[test]
    fn update_then_read_returns_new_value() {
        let mut content = store(UnresolvedPathPolicy::Fail);
        content.update_str("hero.title", "Renewed").unwrap();
        assert_eq!(
            content.read(&path("hero.title")).unwrap(),
            FieldValue::Text("Renewed".to_owned())
        );
    }

    #[test]
    fn update_leaves_siblings_untouched() {
        let mut content = store(UnresolvedPathPolicy::Fail);
        let before = content.get();
        content.update_str("blog[1].excerpt", "Shorter").unwrap();

        let mut expected = before;
        expected.blog[1].excerpt = "Shorter".to_owned();
        assert_eq!(content.get(), expected);
    }

    #[test]
    fn replacing_one_skill_keeps_the_rest() {
        let mut content = store(UnresolvedPathPolicy::Fail);
        let before = content.get().expertise[1].skills.clone();

        content.update_str("expertise[1].skills[0]", "Red Teaming").unwrap();

        let after = &content.get().expertise[1].skills;
        assert_eq!(after.len(), before.len());
        assert_eq!(after[0], "Red Teaming");
        assert_eq!(after[1..], before[1..]);
    }

    #[test]
    fn whole_skill_list_can_be_replaced() {
        let mut content = store(UnresolvedPathPolicy::Fail);
        let skills = vec!["One".to_owned(), "Two".to_owned()];
        content
            .update_str("expertise[0].skills", skills.clone())
            .unwrap();
        assert_eq!(content.get().expertise[0].skills, skills);
    }

    #[test]
    fn unresolved_path_fails_loudly_under_fail_policy() {
        let mut content = store(UnresolvedPathPolicy::Fail);
        let before = content.get();
        let err = content.update_str("expertise[9].title", "Ghost").unwrap_err();
        assert!(matches!(err, ContentError::UnresolvedPath { .. }), "{err}");
        assert_eq!(content.get(), before);
    }

    #[test]
    fn unresolved_path_is_ignored_under_ignore_policy() {
        let mut content = store(UnresolvedPathPolicy::Ignore);
        let before = content.get();
        content.update_str("hero.tagline", "Ghost").unwrap();
        assert_eq!(content.get(), before);
    }

    #[test]
    fn syntax_errors_are_reported_under_any_policy() {
        let mut content = store(UnresolvedPathPolicy::Ignore);
        let err = content.update_str("hero..title", "x").unwrap_err();
        assert!(matches!(err, ContentError::Path(_)));
    }

    #[test]
    fn wrong_value_kind_changes_nothing() {
        let mut content = store(UnresolvedPathPolicy::Fail);
        let before = content.get();
        let err = content
            .update(&path("testimonials[0].rating"), FieldValue::Text("five".to_owned()))
            .unwrap_err();
        assert!(matches!(err, ContentError::ValueMismatch { .. }));
        let err = content
            .update(&path("testimonials[0].rating"), FieldValue::Rating(6))
            .unwrap_err();
        assert!(matches!(err, ContentError::RatingOutOfRange { value: 6, .. }));
        assert_eq!(content.get(), before);
    }

    #[test]
    fn export_import_is_identity() {
        let mut content = store(UnresolvedPathPolicy::Fail);
        content.update_str("hero.subtitle", "Edited ✓").unwrap();
        let snapshot = content.get();

        let export = content.export().unwrap();
        assert!(export.file_name.starts_with("renaissance-content-"));
        assert!(export.file_name.ends_with(".json"));

        let mut other = store(UnresolvedPathPolicy::Fail);
        other.import(&export.contents).unwrap();
        assert_eq!(other.get(), snapshot);
    }

    #[test]
    fn failed_import_leaves_document_as_it_was() {
        let mut content = store(UnresolvedPathPolicy::Fail);
        content.update_str("hero.title", "Kept").unwrap();
        let before = content.get();

        for text in ["", "{", "[]", r#"{"hero":{"title":"x","subtitle":"y"}}"#] {
            let err = content.import(text).unwrap_err();
            assert!(matches!(err, ContentError::Malformed(_)), "{text:?}: {err}");
            assert_eq!(content.get(), before);
        }
    }

    #[tokio::test]
    async fn save_sets_baseline_and_survives_reload() {
        let storage = MemoryStorage::new();
        let mut content = ContentStore::load(Arc::new(storage.clone()), UnresolvedPathPolicy::Fail).await;
        assert!(!content.has_unsaved_changes());

        content.update_str("hero.title", "Saved title").unwrap();
        assert!(content.has_unsaved_changes());
        content.save().await.unwrap();
        assert!(!content.has_unsaved_changes());

        let reloaded = ContentStore::load(Arc::new(storage), UnresolvedPathPolicy::Fail).await;
        assert_eq!(reloaded.get().hero.title, "Saved title");
    }

    #[tokio::test]
    async fn unreadable_saved_content_falls_back_to_seed() {
        let storage = MemoryStorage::new();
        storage.put(CONTENT_KEY, b"{\"hero\":").await.unwrap();
        let content = ContentStore::load(Arc::new(storage), UnresolvedPathPolicy::Fail).await;
        assert_eq!(content.get(), Document::seed());
    }

    #[test]
    fn revert_restores_baseline() {
        let mut content = store(UnresolvedPathPolicy::Fail);
        content.update_str("hero.title", "Draft").unwrap();
        content.revert();
        assert_eq!(content.get(), Document::seed());
        assert!(!content.has_unsaved_changes());
    }

    #[test]
    fn toggle_flips_flag() {
        let mut content = store(UnresolvedPathPolicy::Fail);
        assert!(!content.edit_mode_requested());
        content.toggle_admin_mode();
        assert!(content.edit_mode_requested());
        content.toggle_admin_mode();
        assert!(!content.edit_mode_requested());
    }

    #[test]
    fn subscribers_wake_only_on_effective_change() {
        let mut content = store(UnresolvedPathPolicy::Fail);
        let mut rx = content.subscribe();

        let current = content.get().hero.title;
        content.update_str("hero.title", current).unwrap();
        assert!(!rx.has_changed().unwrap());

        content.update_str("hero.title", "Different").unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().hero.title, "Different");
    }
}
