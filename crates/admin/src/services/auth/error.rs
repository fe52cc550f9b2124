//! Admin authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::error::AppError;
use crate::identity::IdentityError;

/// Errors that can occur during admin authentication operations.
#[derive(Debug, Error)]
pub enum AdminAuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] taskmaster_core::EmailError),

    /// Email or password rejected at sign-in.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Current password rejected during a password change.
    #[error("current password is incorrect")]
    WrongCurrentPassword,

    /// New password and confirmation differ.
    #[error("new passwords do not match")]
    PasswordMismatch,

    /// New password rejected as too weak.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// The provider wants a fresh sign-in before changing credentials.
    #[error("session expired")]
    SessionExpired,

    /// Too many failed attempts.
    #[error("too many attempts")]
    TooManyAttempts,

    /// Any other identity provider failure.
    #[error("identity provider error during {action}: {source}")]
    Identity {
        action: &'static str,
        #[source]
        source: IdentityError,
    },

    /// Account record access failed.
    #[error("account record error during {action}: {source}")]
    Repository {
        action: &'static str,
        #[source]
        source: RepositoryError,
    },
}

impl AdminAuthError {
    /// Classify a provider error raised while performing `action`.
    pub(super) fn from_identity(action: &'static str, source: IdentityError) -> Self {
        match source {
            IdentityError::WeakPassword(msg) => Self::WeakPassword(msg),
            IdentityError::SessionExpired => Self::SessionExpired,
            IdentityError::TooManyAttempts => Self::TooManyAttempts,
            source => Self::Identity { action, source },
        }
    }
}

impl From<AdminAuthError> for AppError {
    fn from(err: AdminAuthError) -> Self {
        match err {
            AdminAuthError::InvalidEmail(_) => Self::BadRequest("Invalid email address".to_string()),
            AdminAuthError::InvalidCredentials => {
                Self::Unauthorized("Invalid email or password".to_string())
            }
            AdminAuthError::WrongCurrentPassword => {
                Self::Unauthorized("Current password is incorrect".to_string())
            }
            AdminAuthError::PasswordMismatch => {
                Self::BadRequest("New passwords do not match".to_string())
            }
            AdminAuthError::WeakPassword(_) => {
                Self::BadRequest("Password must be at least 6 characters".to_string())
            }
            AdminAuthError::SessionExpired => {
                Self::Unauthorized("Session expired, sign in again".to_string())
            }
            AdminAuthError::TooManyAttempts => {
                Self::Unauthorized("Too many attempts, try again later".to_string())
            }
            AdminAuthError::Identity { action, source } => Self::operation(action, source),
            AdminAuthError::Repository { action, source } => Self::operation(action, source),
        }
    }
}
