//! Identity provider seam: email/password sign-in and password rotation.

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

/// Errors returned by an [`IdentityProvider`].
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Email or password is wrong, or the account is disabled.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The provider rejected the new password.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// The sign-in session is too old for a sensitive operation.
    #[error("session expired, sign in again")]
    SessionExpired,

    /// Too many failed attempts.
    #[error("too many attempts, try again later")]
    TooManyAttempts,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Any other provider error.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse the provider's response.
    #[error("parse error: {0}")]
    Parse(String),
}

/// A signed-in identity, valid for follow-up credential operations.
#[derive(Clone)]
pub struct IdentitySession {
    /// Provider user ID.
    pub uid: String,
    /// Email as known to the provider.
    pub email: String,
    /// Short-lived token proving the sign-in.
    pub id_token: SecretString,
}

impl std::fmt::Debug for IdentitySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentitySession")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("id_token", &"[REDACTED]")
            .finish()
    }
}

/// Hosted email/password identity service.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify an email and password, returning a fresh session.
    async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<IdentitySession, IdentityError>;

    /// Replace the password of the signed-in identity.
    async fn update_password(
        &self,
        session: &IdentitySession,
        new_password: &SecretString,
    ) -> Result<(), IdentityError>;
}
