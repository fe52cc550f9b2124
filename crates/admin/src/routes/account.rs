//! Admin account route handlers.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use taskmaster_core::AccountKey;

use crate::collection::CollectionFilter;
use crate::error::{AppError, OperationContext};
use crate::middleware::RequireAdminAuth;
use crate::models::{Account, CurrentAdmin, Keyed};
use crate::services::{AdminAuthService, PasswordChange, PasswordChangeOutcome};
use crate::state::AppState;

/// Password change form.
#[derive(Deserialize)]
pub struct PasswordChangeRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// The signed-in admin and the account records.
#[derive(Debug, Serialize)]
pub struct AccountOverview {
    pub admin: CurrentAdmin,
    pub accounts: Vec<Keyed<AccountKey, Account>>,
}

/// Build the account router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/account", get(show))
        .route("/api/account/password", post(change_password))
}

/// Admin account records (email and last password change).
///
/// GET /api/account
#[instrument(skip(state, admin), fields(admin = %admin.email))]
async fn show(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
) -> Result<Json<AccountOverview>, AppError> {
    let accounts = state
        .repo::<Account>()
        .list()
        .await
        .context("load accounts")?;

    Ok(Json(AccountOverview {
        admin,
        accounts: CollectionFilter::new(None).apply(&accounts),
    }))
}

/// Change the signed-in admin's password.
///
/// POST /api/account/password
#[instrument(skip(state, admin, form), fields(admin = %admin.email))]
async fn change_password(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Json(form): Json<PasswordChangeRequest>,
) -> Result<Json<PasswordChangeOutcome>, AppError> {
    let change = PasswordChange {
        current_password: SecretString::from(form.current_password),
        new_password: SecretString::from(form.new_password),
        confirm_password: SecretString::from(form.confirm_password),
    };

    let outcome = AdminAuthService::new(state.identity(), state.store())
        .change_password(&admin, &change)
        .await?;
    Ok(Json(outcome))
}
