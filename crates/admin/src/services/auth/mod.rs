//! Admin authentication service.
//!
//! Admins sign in with an email and password checked by the hosted
//! identity provider. Password changes re-verify the current password,
//! rotate the provider credential, then stamp the matching account record.

mod error;

pub use error::AdminAuthError;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::json;

use taskmaster_core::Email;

use crate::db::{DocumentStore, Repository};
use crate::identity::{IdentityError, IdentityProvider};
use crate::models::{Account, CurrentAdmin};

/// Minimum length of a new admin password, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// A password change request.
pub struct PasswordChange {
    pub current_password: SecretString,
    pub new_password: SecretString,
    pub confirm_password: SecretString,
}

/// Result of a completed password change.
#[derive(Debug, Clone, Serialize)]
pub struct PasswordChangeOutcome {
    /// Whether an account record matched the admin's email and was stamped.
    pub account_record_updated: bool,
    /// Time of the change in epoch milliseconds.
    pub password_changed_at: i64,
}

/// Admin authentication service.
pub struct AdminAuthService<'a> {
    identity: &'a dyn IdentityProvider,
    accounts: Repository<'a, Account>,
}

impl<'a> AdminAuthService<'a> {
    /// Create a new admin authentication service.
    #[must_use]
    pub const fn new(identity: &'a dyn IdentityProvider, store: &'a dyn DocumentStore) -> Self {
        Self {
            identity,
            accounts: Repository::new(store),
        }
    }

    /// Verify an admin's email and password.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidEmail` for a malformed email,
    /// `AdminAuthError::InvalidCredentials` if the provider rejects the
    /// credentials, or another variant if the provider call fails.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<CurrentAdmin, AdminAuthError> {
        let email = Email::parse(email)?;
        let session = self
            .identity
            .sign_in(email.as_str(), password)
            .await
            .map_err(|e| match e {
                IdentityError::InvalidCredentials => AdminAuthError::InvalidCredentials,
                other => AdminAuthError::from_identity("sign in", other),
            })?;

        // Prefer the provider's spelling of the address
        let email = Email::parse(&session.email).unwrap_or(email);
        tracing::info!(uid = %session.uid, "Admin signed in");

        Ok(CurrentAdmin {
            uid: session.uid,
            email,
        })
    }

    /// Change the signed-in admin's password.
    ///
    /// Steps run in order and stop at the first failure; earlier steps are
    /// not undone. A wrong current password stops before anything changes.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::PasswordMismatch` or
    /// `AdminAuthError::WeakPassword` for invalid input,
    /// `AdminAuthError::WrongCurrentPassword` if re-authentication fails,
    /// or another variant if a hosted call fails.
    #[tracing::instrument(skip(self, admin, change), fields(uid = %admin.uid))]
    pub async fn change_password(
        &self,
        admin: &CurrentAdmin,
        change: &PasswordChange,
    ) -> Result<PasswordChangeOutcome, AdminAuthError> {
        let new_password = change.new_password.expose_secret();
        if new_password != change.confirm_password.expose_secret() {
            return Err(AdminAuthError::PasswordMismatch);
        }
        if new_password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AdminAuthError::WeakPassword(format!(
                "must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        let session = self
            .identity
            .sign_in(admin.email.as_str(), &change.current_password)
            .await
            .map_err(|e| match e {
                IdentityError::InvalidCredentials => AdminAuthError::WrongCurrentPassword,
                other => AdminAuthError::from_identity("verify current password", other),
            })?;

        self.identity
            .update_password(&session, &change.new_password)
            .await
            .map_err(|e| AdminAuthError::from_identity("update password", e))?;

        let changed_at = chrono::Utc::now().timestamp_millis();
        let account_record_updated = self.stamp_account(&admin.email, changed_at).await?;

        tracing::info!(account_record_updated, "Admin password changed");
        Ok(PasswordChangeOutcome {
            account_record_updated,
            password_changed_at: changed_at,
        })
    }

    /// Record the change on the account matching `email` and scrub any
    /// legacy plaintext password. Returns whether a record matched.
    async fn stamp_account(&self, email: &Email, changed_at: i64) -> Result<bool, AdminAuthError> {
        let accounts = self
            .accounts
            .list()
            .await
            .map_err(|source| AdminAuthError::Repository {
                action: "load account records",
                source,
            })?;

        let Some(key) = accounts
            .iter()
            .find(|(_, account)| email.matches(&account.email))
            .map(|(key, _)| key.clone())
        else {
            tracing::warn!(email = %email, "No account record matches admin email");
            return Ok(false);
        };

        self.accounts
            .update(
                &key,
                &json!({ "passwordChangedAt": changed_at, "password": null }),
            )
            .await
            .map_err(|source| AdminAuthError::Repository {
                action: "update account record",
                source,
            })?;
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fake::FakeBackends;
    use serde_json::json;

    const EMAIL: &str = "ops@taskmaster.app";

    fn backends() -> FakeBackends {
        let fakes = FakeBackends::with_root(json!({
            "accounts": {
                "acc1": {"email": "Ops@TaskMaster.app", "password": "old-pass"},
                "acc2": {"email": "other@taskmaster.app"}
            }
        }));
        fakes.identity.add_account(EMAIL, "old-pass");
        fakes
    }

    fn admin() -> CurrentAdmin {
        CurrentAdmin {
            uid: "uid-1".to_string(),
            email: Email::parse(EMAIL).unwrap(),
        }
    }

    fn change(current: &str, new: &str, confirm: &str) -> PasswordChange {
        PasswordChange {
            current_password: SecretString::from(current),
            new_password: SecretString::from(new),
            confirm_password: SecretString::from(confirm),
        }
    }

    #[tokio::test]
    async fn test_login_success() {
        let fakes = backends();
        let service = AdminAuthService::new(fakes.identity.as_ref(), fakes.store.as_ref());
        let admin = service
            .login(EMAIL, &SecretString::from("old-pass"))
            .await
            .unwrap();
        assert_eq!(admin.uid, "uid-1");
        assert_eq!(admin.email.as_str(), EMAIL);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let fakes = backends();
        let service = AdminAuthService::new(fakes.identity.as_ref(), fakes.store.as_ref());
        let result = service.login(EMAIL, &SecretString::from("nope")).await;
        assert!(matches!(result, Err(AdminAuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_rejects_malformed_email() {
        let fakes = backends();
        let service = AdminAuthService::new(fakes.identity.as_ref(), fakes.store.as_ref());
        let result = service.login("not-an-email", &SecretString::from("x")).await;
        assert!(matches!(result, Err(AdminAuthError::InvalidEmail(_))));
        assert_eq!(fakes.identity.sign_ins(), 0);
    }

    #[tokio::test]
    async fn test_change_password_stamps_account_and_scrubs_legacy_field() {
        let fakes = backends();
        let service = AdminAuthService::new(fakes.identity.as_ref(), fakes.store.as_ref());
        let outcome = service
            .change_password(&admin(), &change("old-pass", "new-pass", "new-pass"))
            .await
            .unwrap();

        assert!(outcome.account_record_updated);
        assert_eq!(fakes.identity.password_of(EMAIL).as_deref(), Some("new-pass"));
        let record = fakes.store.snapshot("accounts/acc1").unwrap();
        assert_eq!(record["passwordChangedAt"], json!(outcome.password_changed_at));
        assert!(record.get("password").is_none());
        assert!(fakes.store.snapshot("accounts/acc2/passwordChangedAt").is_none());
    }

    #[tokio::test]
    async fn test_change_password_mismatch_calls_nothing() {
        let fakes = backends();
        let service = AdminAuthService::new(fakes.identity.as_ref(), fakes.store.as_ref());
        let result = service
            .change_password(&admin(), &change("old-pass", "new-pass", "new-pasS"))
            .await;
        assert!(matches!(result, Err(AdminAuthError::PasswordMismatch)));
        assert_eq!(fakes.identity.sign_ins(), 0);
        assert_eq!(fakes.identity.password_updates(), 0);
    }

    #[tokio::test]
    async fn test_change_password_too_short() {
        let fakes = backends();
        let service = AdminAuthService::new(fakes.identity.as_ref(), fakes.store.as_ref());
        let result = service
            .change_password(&admin(), &change("old-pass", "abc", "abc"))
            .await;
        assert!(matches!(result, Err(AdminAuthError::WeakPassword(_))));
        assert_eq!(fakes.identity.sign_ins(), 0);
    }

    #[tokio::test]
    async fn test_change_password_wrong_current_stops_early() {
        let fakes = backends();
        let service = AdminAuthService::new(fakes.identity.as_ref(), fakes.store.as_ref());
        let result = service
            .change_password(&admin(), &change("wrong", "new-pass", "new-pass"))
            .await;
        assert!(matches!(result, Err(AdminAuthError::WrongCurrentPassword)));
        assert_eq!(fakes.identity.password_updates(), 0);
        assert_eq!(fakes.store.writes(), 0);
    }

    #[tokio::test]
    async fn test_change_password_without_account_record() {
        let fakes = FakeBackends::new();
        fakes.identity.add_account(EMAIL, "old-pass");
        let service = AdminAuthService::new(fakes.identity.as_ref(), fakes.store.as_ref());
        let outcome = service
            .change_password(&admin(), &change("old-pass", "new-pass", "new-pass"))
            .await
            .unwrap();
        assert!(!outcome.account_record_updated);
        assert_eq!(fakes.identity.password_of(EMAIL).as_deref(), Some("new-pass"));
    }

    #[tokio::test]
    async fn test_change_password_provider_failure_skips_record() {
        let fakes = backends();
        fakes.identity.fail_updates(true);
        let service = AdminAuthService::new(fakes.identity.as_ref(), fakes.store.as_ref());
        let result = service
            .change_password(&admin(), &change("old-pass", "new-pass", "new-pass"))
            .await;
        assert!(matches!(
            result,
            Err(AdminAuthError::Identity {
                action: "update password",
                ..
            })
        ));
        assert_eq!(fakes.store.writes(), 0);
    }
}
