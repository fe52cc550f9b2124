//! Banner route handlers.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use tracing::instrument;

use taskmaster_core::BannerKey;

use super::{ListQuery, Listing, parse_key};
use crate::collection::CollectionFilter;
use crate::error::{AppError, OperationContext};
use crate::middleware::RequireAdminAuth;
use crate::models::{Banner, Keyed};
use crate::services::{BannerImage, BannerInput, BannerService};
use crate::state::AppState;

/// Maximum accepted banner form size (image included).
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Build the banners router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/banners", get(index).post(create))
        .route("/api/banners/{id}", put(update).delete(destroy))
        .route("/api/banners/{id}/toggle", post(toggle))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

fn service(state: &AppState) -> BannerService<'_> {
    BannerService::new(state.store(), state.blobs(), &state.mirrors().banners)
}

/// Parse a checkbox-style form value.
fn parse_flag(raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "1" | "yes" => Ok(true),
        "false" | "off" | "0" | "no" => Ok(false),
        other => Err(AppError::BadRequest(format!("Invalid active flag: {other}"))),
    }
}

/// Read the banner form fields from a multipart body.
async fn read_form(mut multipart: Multipart) -> Result<BannerInput, AppError> {
    let bad_form = |e: axum::extract::multipart::MultipartError| {
        AppError::BadRequest(format!("Invalid form data: {e}"))
    };

    let mut input = BannerInput::default();
    while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let file_name = field.file_name().unwrap_or("image").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(bad_form)?;
                if !bytes.is_empty() {
                    input.image = Some(BannerImage {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            "title" => input.title = field.text().await.map_err(bad_form)?,
            "description" => input.description = Some(field.text().await.map_err(bad_form)?),
            "link" => input.link = Some(field.text().await.map_err(bad_form)?),
            "active" => input.active = Some(parse_flag(&field.text().await.map_err(bad_form)?)?),
            other => tracing::debug!(field = other, "Ignoring unknown banner form field"),
        }
    }
    Ok(input)
}

/// List banners, filtered by title, description or link.
///
/// GET /api/banners
#[instrument(skip(state, _admin))]
async fn index(
    State(state): State<AppState>,
    _admin: RequireAdminAuth,
    Query(query): Query<ListQuery>,
) -> Result<Json<Listing<Keyed<BannerKey, Banner>>>, AppError> {
    let banners = state
        .mirrors()
        .banners
        .load(&state.repo(), query.refresh)
        .await
        .context("load banners")?;

    let items = CollectionFilter::new(query.q.as_deref()).apply(&banners);
    Ok(Json(Listing::new(banners.len(), items)))
}

/// Create a banner from a multipart form.
///
/// POST /api/banners
#[instrument(skip_all)]
async fn create(
    State(state): State<AppState>,
    _admin: RequireAdminAuth,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Keyed<BannerKey, Banner>>), AppError> {
    let input = read_form(multipart).await?;
    let banner = service(&state).create(input).await?;
    Ok((StatusCode::CREATED, Json(banner)))
}

/// Edit a banner; the image is replaced only when one is uploaded.
///
/// PUT /api/banners/{id}
#[instrument(skip(state, _admin, multipart))]
async fn update(
    State(state): State<AppState>,
    _admin: RequireAdminAuth,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Keyed<BannerKey, Banner>>, AppError> {
    let key: BannerKey = parse_key(&id)?;
    let input = read_form(multipart).await?;
    let banner = service(&state).update(&key, input).await?;
    Ok(Json(banner))
}

/// Flip a banner's active flag.
///
/// POST /api/banners/{id}/toggle
#[instrument(skip(state, _admin))]
async fn toggle(
    State(state): State<AppState>,
    _admin: RequireAdminAuth,
    Path(id): Path<String>,
) -> Result<Json<Keyed<BannerKey, Banner>>, AppError> {
    let key: BannerKey = parse_key(&id)?;
    let banner = service(&state).toggle(&key).await?;
    Ok(Json(banner))
}

/// Delete a banner and its image.
///
/// DELETE /api/banners/{id}
#[instrument(skip(state, _admin))]
async fn destroy(
    State(state): State<AppState>,
    _admin: RequireAdminAuth,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let key: BannerKey = parse_key(&id)?;
    service(&state).delete(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}
