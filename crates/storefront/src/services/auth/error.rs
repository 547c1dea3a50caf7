//! Authentication error types.

use thiserror::Error;

use crate::api::ApiError;

/// A rejected login form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Username is required")]
    UsernameRequired,

    #[error("Username must be at most {max} characters")]
    UsernameTooLong {
        /// Maximum accepted length in bytes.
        max: usize,
    },

    #[error("Password is required")]
    PasswordRequired,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum accepted length.
        min: usize,
    },
}

impl FieldError {
    /// Form field the error belongs to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::UsernameRequired | Self::UsernameTooLong { .. } => "username",
            Self::PasswordRequired | Self::PasswordTooShort { .. } => "password",
        }
    }
}

/// Errors that can occur during a login attempt.
#[derive(Debug, Error)]
pub enum LoginError {
    /// The form was rejected before contacting the API.
    #[error("invalid login form: {}", format_field_errors(.0))]
    InvalidForm(Vec<FieldError>),

    /// The session store cannot start an attempt in its current state.
    #[error("a login cannot start while {0}")]
    NotReady(&'static str),

    /// The API rejected the attempt or could not be reached.
    #[error("login failed: {0}")]
    Failed(#[source] ApiError),

    /// A session could not be built from the API response.
    #[error("login failed: {0}")]
    InvalidIdentity(#[from] eliteshop_core::EmailError),
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
