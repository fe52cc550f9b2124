//! Authentication route handlers for admin.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::middleware::{
    OptionalAdminAuth, RequireAdminAuth, clear_current_admin, set_current_admin,
};
use crate::models::CurrentAdmin;
use crate::services::AdminAuthService;
use crate::state::AppState;

/// Login form.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/session", get(current_session))
}

/// Sign in and start a session.
///
/// POST /auth/login
#[instrument(skip(state, session, form), fields(email = %form.email))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginRequest>,
) -> Result<Json<CurrentAdmin>, AppError> {
    let password = SecretString::from(form.password);
    let admin = AdminAuthService::new(state.identity(), state.store())
        .login(&form.email, &password)
        .await?;

    set_current_admin(&session, &admin)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    set_sentry_user(&admin.uid, admin.email.as_str());

    Ok(Json(admin))
}

/// Logout and clear session.
///
/// POST /auth/logout
async fn logout(session: Session, OptionalAdminAuth(admin): OptionalAdminAuth) -> StatusCode {
    if let Some(admin) = admin {
        tracing::info!(uid = %admin.uid, "Admin signed out");
    }
    if let Err(e) = clear_current_admin(&session).await {
        tracing::warn!(error = %e, "Failed to clear admin session");
    }
    clear_sentry_user();
    StatusCode::NO_CONTENT
}

/// The signed-in admin.
///
/// GET /auth/session
async fn current_session(RequireAdminAuth(admin): RequireAdminAuth) -> Json<CurrentAdmin> {
    Json(admin)
}
