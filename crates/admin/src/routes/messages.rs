//! Customer message route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use tracing::instrument;

use taskmaster_core::MessageKey;

use super::{ListQuery, Listing, parse_key};
use crate::collection::CollectionFilter;
use crate::error::{AppError, OperationContext};
use crate::middleware::RequireAdminAuth;
use crate::models::{Keyed, Message};
use crate::state::AppState;

/// Build the messages router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/messages", get(index))
        .route("/api/messages/{id}", get(show).delete(destroy))
}

/// List messages, filtered by sender email or text.
///
/// GET /api/messages
#[instrument(skip(state, _admin))]
async fn index(
    State(state): State<AppState>,
    _admin: RequireAdminAuth,
    Query(query): Query<ListQuery>,
) -> Result<Json<Listing<Keyed<MessageKey, Message>>>, AppError> {
    let messages = state
        .mirrors()
        .messages
        .load(&state.repo(), query.refresh)
        .await
        .context("load messages")?;

    let items = CollectionFilter::new(query.q.as_deref()).apply(&messages);
    Ok(Json(Listing::new(messages.len(), items)))
}

/// Show one message.
///
/// GET /api/messages/{id}
#[instrument(skip(state, _admin))]
async fn show(
    State(state): State<AppState>,
    _admin: RequireAdminAuth,
    Path(id): Path<String>,
) -> Result<Json<Keyed<MessageKey, Message>>, AppError> {
    let key: MessageKey = parse_key(&id)?;
    let messages = state
        .mirrors()
        .messages
        .load(&state.repo(), false)
        .await
        .context("load messages")?;

    let message = messages
        .get(&key)
        .cloned()
        .ok_or_else(|| AppError::NotFound("Message not found".to_string()))?;
    Ok(Json(Keyed::new(key, message)))
}

/// Delete a message.
///
/// DELETE /api/messages/{id}
#[instrument(skip(state, _admin))]
async fn destroy(
    State(state): State<AppState>,
    _admin: RequireAdminAuth,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let key: MessageKey = parse_key(&id)?;
    state
        .repo::<Message>()
        .delete(&key)
        .await
        .context("delete message")?;
    state.mirrors().messages.remove(&key).await;

    Ok(StatusCode::NO_CONTENT)
}
