//! FAQ route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use tracing::instrument;

use taskmaster_core::FaqCategory;

use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::{Faq, FaqList};
use crate::services::{FaqCatalog, FaqService};
use crate::state::AppState;

/// Build the FAQ router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/faqs", get(index))
        .route("/api/faqs/{category}", post(create))
        .route("/api/faqs/{category}/{index}", put(update).delete(destroy))
}

fn parse_category(raw: &str) -> Result<FaqCategory, AppError> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("Unknown FAQ category: {raw}")))
}

/// Both FAQ categories.
///
/// GET /api/faqs
#[instrument(skip(state, _admin))]
async fn index(
    State(state): State<AppState>,
    _admin: RequireAdminAuth,
) -> Result<Json<FaqCatalog>, AppError> {
    let catalog = FaqService::new(state.store()).list().await?;
    Ok(Json(catalog))
}

/// Append an entry to a category.
///
/// POST /api/faqs/{category}
#[instrument(skip(state, _admin, faq))]
async fn create(
    State(state): State<AppState>,
    _admin: RequireAdminAuth,
    Path(category): Path<String>,
    Json(faq): Json<Faq>,
) -> Result<(StatusCode, Json<FaqList>), AppError> {
    let category = parse_category(&category)?;
    let list = FaqService::new(state.store()).add(category, faq).await?;
    Ok((StatusCode::CREATED, Json(list)))
}

/// Edit the entry at `index`.
///
/// PUT /api/faqs/{category}/{index}
#[instrument(skip(state, _admin, faq))]
async fn update(
    State(state): State<AppState>,
    _admin: RequireAdminAuth,
    Path((category, index)): Path<(String, usize)>,
    Json(faq): Json<Faq>,
) -> Result<Json<FaqList>, AppError> {
    let category = parse_category(&category)?;
    let list = FaqService::new(state.store())
        .update(category, index, faq)
        .await?;
    Ok(Json(list))
}

/// Remove the entry at `index`.
///
/// DELETE /api/faqs/{category}/{index}
#[instrument(skip(state, _admin))]
async fn destroy(
    State(state): State<AppState>,
    _admin: RequireAdminAuth,
    Path((category, index)): Path<(String, usize)>,
) -> Result<Json<FaqList>, AppError> {
    let category = parse_category(&category)?;
    let list = FaqService::new(state.store()).delete(category, index).await?;
    Ok(Json(list))
}
