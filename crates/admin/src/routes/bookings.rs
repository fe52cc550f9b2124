//! Booking route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use taskmaster_core::{BookingKey, BookingStatus};

use super::{Listing, parse_key};
use crate::collection::CollectionFilter;
use crate::error::{AppError, OperationContext};
use crate::middleware::RequireAdminAuth;
use crate::models::{Booking, Keyed, StatusFilter};
use crate::state::AppState;

/// Booking list query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct BookingQuery {
    pub q: Option<String>,
    /// `all`, `pending`, `completed`, `absent` or `none`.
    pub status: Option<String>,
    #[serde(default)]
    pub refresh: bool,
}

/// New status for a booking.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

/// Build the bookings router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/bookings", get(index))
        .route("/api/bookings/{id}/status", patch(update_status))
}

/// List bookings, filtered by status first and then free text.
///
/// GET /api/bookings
#[instrument(skip(state, _admin))]
async fn index(
    State(state): State<AppState>,
    _admin: RequireAdminAuth,
    Query(query): Query<BookingQuery>,
) -> Result<Json<Listing<Keyed<BookingKey, Booking>>>, AppError> {
    let status: StatusFilter = query
        .status
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(AppError::BadRequest)?;

    let bookings = state
        .mirrors()
        .bookings
        .load(&state.repo(), query.refresh)
        .await
        .context("load bookings")?;

    let items =
        CollectionFilter::new(query.q.as_deref()).apply_where(&bookings, |b| status.matches(b));
    Ok(Json(Listing::new(bookings.len(), items)))
}

/// Set a booking's status. Only `status` is written.
///
/// The booking is looked up in the store, so records created since the
/// mirror was loaded can be updated too.
///
/// PATCH /api/bookings/{id}/status
#[instrument(skip(state, _admin))]
async fn update_status(
    State(state): State<AppState>,
    _admin: RequireAdminAuth,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Keyed<BookingKey, Booking>>, AppError> {
    let key: BookingKey = parse_key(&id)?;
    let status: BookingStatus = update
        .status
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid status: {}", update.status)))?;

    let repo = state.repo::<Booking>();
    let mirror = &state.mirrors().bookings;
    let mut booking = repo
        .get(&key)
        .await
        .context("load booking")?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    repo.update(&key, &json!({ "status": status.as_str() }))
        .await
        .context("update booking status")?;

    booking.status = Some(status.as_str().to_string());
    let booking = mirror
        .sync_record(&repo, &key, Some(booking.clone()))
        .await
        .unwrap_or(booking);

    tracing::info!(booking = %key, status = %status, "Booking status updated");
    Ok(Json(Keyed::new(key, booking)))
}
