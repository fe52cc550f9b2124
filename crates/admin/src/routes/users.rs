//! Marketplace user route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
};
use tracing::instrument;

use taskmaster_core::UserKey;

use super::{ListQuery, Listing, parse_key};
use crate::collection::CollectionFilter;
use crate::error::{AppError, OperationContext};
use crate::middleware::RequireAdminAuth;
use crate::models::{User, UserView};
use crate::state::AppState;

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(index))
        .route("/api/users/{id}", delete(destroy))
}

/// List users, filtered by email, name or user type.
///
/// GET /api/users
#[instrument(skip(state, _admin))]
async fn index(
    State(state): State<AppState>,
    _admin: RequireAdminAuth,
    Query(query): Query<ListQuery>,
) -> Result<Json<Listing<UserView>>, AppError> {
    let users = state
        .mirrors()
        .users
        .load(&state.repo(), query.refresh)
        .await
        .context("load users")?;

    let items = CollectionFilter::new(query.q.as_deref())
        .apply(&users)
        .into_iter()
        .map(|keyed| UserView::new(keyed.key, keyed.record))
        .collect();
    Ok(Json(Listing::new(users.len(), items)))
}

/// Delete a user record.
///
/// DELETE /api/users/{id}
#[instrument(skip(state, admin), fields(admin = %admin.0.email))]
async fn destroy(
    State(state): State<AppState>,
    admin: RequireAdminAuth,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let key: UserKey = parse_key(&id)?;
    state
        .repo::<User>()
        .delete(&key)
        .await
        .context("delete user")?;
    state.mirrors().users.remove(&key).await;

    tracing::info!(user = %key, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
