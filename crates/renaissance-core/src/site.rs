//! Site state: both stores, owned together and handed to the UI.
//!
//! This is the only place the effective admin mode is computed. A page
//! renders fields as editable only when [`SiteState::admin_mode`] is true,
//! which needs both an admin session and the edit-mode flag.

use std::sync::Arc;

use renaissance_storage::ClientStorage;
use tracing::info;

use crate::auth::CredentialVerifier;
use crate::content::{ContentExport, ContentStore, UnresolvedPathPolicy};
use crate::error::SiteError;
use crate::field::FieldValue;
use crate::form::{AuthMode, SignInForm};
use crate::path::ContentPath;
use crate::session::{Session, SessionStore};

/// How a renderer should present document fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMode {
    Static,
    Editable,
}

/// The content and session stores of one page.
#[derive(Debug)]
pub struct SiteState {
    content: ContentStore,
    session: SessionStore,
}

impl SiteState {
    #[must_use]
    pub fn new(content: ContentStore, session: SessionStore) -> Self {
        Self { content, session }
    }

    /// Page startup: load saved content and restore the session.
    pub async fn open(
        storage: Arc<dyn ClientStorage>,
        verifier: Arc<dyn CredentialVerifier>,
        policy: UnresolvedPathPolicy,
    ) -> Self {
        let content = ContentStore::load(Arc::clone(&storage), policy).await;
        let mut session = SessionStore::new(storage, verifier);
        session.restore().await;
        Self::new(content, session)
    }

    #[must_use]
    pub fn content(&self) -> &ContentStore {
        &self.content
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Admin session AND edit mode requested.
    #[must_use]
    pub fn admin_mode(&self) -> bool {
        self.session.is_admin() && self.content.edit_mode_requested()
    }

    #[must_use]
    pub fn field_mode(&self) -> FieldMode {
        if self.admin_mode() {
            FieldMode::Editable
        } else {
            FieldMode::Static
        }
    }

    /// Apply an inline edit.
    ///
    /// # Errors
    ///
    /// [`SiteError::NotEditable`] outside admin mode, otherwise whatever the
    /// content store reports.
    pub fn edit(&mut self, path: &ContentPath, value: FieldValue) -> Result<(), SiteError> {
        if !self.admin_mode() {
            return Err(SiteError::NotEditable);
        }
        self.content.update(path, value)?;
        Ok(())
    }

    /// Flip the edit-mode flag and return the resulting admin mode.
    pub fn toggle_admin_mode(&mut self) -> bool {
        self.content.toggle_admin_mode();
        self.admin_mode()
    }

    /// # Errors
    ///
    /// [`SiteError::AdminRequired`] for non-admins, or a storage failure.
    pub async fn save_content(&mut self) -> Result<(), SiteError> {
        self.require_admin("saving content")?;
        self.content.save().await?;
        Ok(())
    }

    /// # Errors
    ///
    /// [`SiteError::AdminRequired`] for non-admins.
    pub fn export_content(&self) -> Result<ContentExport, SiteError> {
        self.require_admin("exporting content")?;
        Ok(self.content.export()?)
    }

    /// # Errors
    ///
    /// [`SiteError::AdminRequired`] for non-admins, or
    /// [`ContentError::Malformed`](crate::error::ContentError::Malformed).
    pub fn import_content(&mut self, text: &str) -> Result<(), SiteError> {
        self.require_admin("importing content")?;
        self.content.import(text)?;
        Ok(())
    }

    /// Validate the form, then log in.
    ///
    /// # Errors
    ///
    /// [`SiteError::Validation`] with every failing field, or a session
    /// error from the store.
    pub async fn sign_in(&mut self, mode: AuthMode, form: &SignInForm) -> Result<Session, SiteError> {
        let request = form.validate(mode)?;
        Ok(self.session.login(&request).await?)
    }

    /// Log out and leave edit mode.
    pub async fn sign_out(&mut self) {
        self.session.logout().await;
        if self.content.edit_mode_requested() {
            info!("leaving edit mode on sign-out");
            self.content.set_edit_mode(false);
        }
    }

    fn require_admin(&self, operation: &'static str) -> Result<(), SiteError> {
        if self.session.is_admin() {
            Ok(())
        } else {
            Err(SiteError::AdminRequired { operation })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::DemoVerifier;
    use crate::error::SessionError;
    use renaissance_storage::MemoryStorage;

    async fn site() -> SiteState {
        SiteState::open(
            Arc::new(MemoryStorage::new()),
            Arc::new(DemoVerifier),
            UnresolvedPathPolicy::Fail,
        )
        .await
    }

    fn title() -> ContentPath {
        ContentPath::field("hero").then_field("title")
    }

    #[tokio::test]
    async fn anonymous_page_is_static() {
        let mut site = site().await;
        assert_eq!(site.field_mode(), FieldMode::Static);
        assert!(!site.toggle_admin_mode());
        assert!(matches!(
            site.edit(&title(), "x".into()),
            Err(SiteError::NotEditable)
        ));
    }

    #[tokio::test]
    async fn admin_edits_only_in_edit_mode() {
        let mut site = site().await;
        site.sign_in(AuthMode::Login, &SignInForm::login("Admin", "admin123"))
            .await
            .unwrap();
        assert!(matches!(
            site.edit(&title(), "x".into()),
            Err(SiteError::NotEditable)
        ));

        assert!(site.toggle_admin_mode());
        site.edit(&title(), "Edited".into()).unwrap();
        assert_eq!(site.content().get().hero.title, "Edited");
        assert!(site.content().has_unsaved_changes());

        site.save_content().await.unwrap();
        assert!(!site.content().has_unsaved_changes());
    }

    #[tokio::test]
    async fn edit_mode_set_before_login_applies_to_admin() {
        let mut site = site().await;
        assert!(!site.toggle_admin_mode());
        site.sign_in(AuthMode::Login, &SignInForm::login("Admin", "admin123"))
            .await
            .unwrap();
        assert!(site.admin_mode());
    }

    #[tokio::test]
    async fn sign_out_leaves_edit_mode() {
        let mut site = site().await;
        site.sign_in(AuthMode::Login, &SignInForm::login("Admin", "admin123"))
            .await
            .unwrap();
        site.toggle_admin_mode();
        site.sign_out().await;

        assert!(!site.content().edit_mode_requested());
        site.sign_in(AuthMode::Login, &SignInForm::login("Admin", "admin123"))
            .await
            .unwrap();
        assert!(!site.admin_mode());
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_the_session_store() {
        let mut site = site().await;
        let err = site
            .sign_in(AuthMode::Login, &SignInForm::login("", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, SiteError::Validation(ref e) if e.fields.len() == 2));
        assert!(!site.session().is_authenticated());
    }

    #[tokio::test]
    async fn sign_in_twice_is_refused() {
        let mut site = site().await;
        site.sign_in(AuthMode::Login, &SignInForm::login("anyone", "x"))
            .await
            .unwrap();
        let err = site
            .sign_in(AuthMode::Login, &SignInForm::login("Admin", "admin123"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SiteError::Session(SessionError::AlreadyAuthenticated { .. })
        ));
    }

    #[tokio::test]
    async fn admin_panel_is_admin_only() {
        let mut site = site().await;
        assert!(matches!(
            site.export_content(),
            Err(SiteError::AdminRequired { operation: "exporting content" })
        ));

        site.sign_in(AuthMode::Login, &SignInForm::login("Admin", "admin123"))
            .await
            .unwrap();
        let export = site.export_content().unwrap();
        site.import_content(&export.contents).unwrap();
    }
}
