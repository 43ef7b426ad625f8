//! Sign-in and sign-up form validation.
//!
//! Runs before the session store is touched. Every failing field gets its
//! own message so the UI can show it next to the input.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::auth::{AuthRequest, Credentials, Profile};
use crate::error::ValidationErrors;
use crate::session::Role;

/// Minimum password length for registration.
pub const MIN_PASSWORD_LEN: usize = 6;

#[allow(clippy::expect_used)]
static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern is valid"));

/// Which form the user is filling in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    SignUpClient,
    SignUpAdmin,
}

impl AuthMode {
    /// Role requested by a sign-up mode.
    #[must_use]
    pub fn requested_role(self) -> Option<Role> {
        match self {
            Self::Login => None,
            Self::SignUpClient => Some(Role::Client),
            Self::SignUpAdmin => Some(Role::Admin),
        }
    }
}

/// Form inputs, named after the fields they are reported against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Username,
    Email,
    Password,
    ConfirmPassword,
    FullName,
    Company,
}

impl FormField {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
            Self::FullName => "fullName",
            Self::Company => "company",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw values typed into the sign-in dialog.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SignInForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub full_name: String,
    pub company: String,
}

impl fmt::Debug for SignInForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInForm")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .field("company", &self.company)
            .finish_non_exhaustive()
    }
}

impl SignInForm {
    /// A login form with just the two required fields.
    #[must_use]
    pub fn login(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    /// Check the form for `mode` and build the request the verifier sees.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] listing every failing field.
    pub fn validate(&self, mode: AuthMode) -> Result<AuthRequest, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if self.username.trim().is_empty() {
            errors.insert(FormField::Username, "Username is required");
        }
        if self.password.is_empty() {
            errors.insert(FormField::Password, "Password is required");
        }

        if mode != AuthMode::Login {
            if self.email.trim().is_empty() {
                errors.insert(FormField::Email, "Email is required");
            } else if !EMAIL_SHAPE.is_match(&self.email) {
                errors.insert(FormField::Email, "Email is invalid");
            }
            if self.full_name.trim().is_empty() {
                errors.insert(FormField::FullName, "Full name is required");
            }
            if self.password != self.confirm_password {
                errors.insert(FormField::ConfirmPassword, "Passwords do not match");
            }
            if self.password.chars().count() < MIN_PASSWORD_LEN {
                errors.insert(
                    FormField::Password,
                    "Password must be at least 6 characters",
                );
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let credentials = Credentials::new(self.username.clone(), self.password.clone());
        Ok(match mode.requested_role() {
            None => AuthRequest::Login { credentials },
            Some(role) => AuthRequest::SignUp {
                credentials,
                profile: Profile {
                    email: self.email.trim().to_owned(),
                    full_name: self.full_name.trim().to_owned(),
                    company: Some(self.company.trim())
                        .filter(|c| !c.is_empty())
                        .map(str::to_owned),
                },
                role,
            },
        })
    }
}
