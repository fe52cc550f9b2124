//! Dashboard route handler.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, OperationContext};
use crate::middleware::RequireAdminAuth;
use crate::services::DashboardStats;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub refresh: bool,
}

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/dashboard", get(index))
}

/// Headline statistics.
///
/// GET /api/dashboard
#[instrument(skip(state, _admin))]
async fn index(
    State(state): State<AppState>,
    _admin: RequireAdminAuth,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardStats>, AppError> {
    let stats = DashboardStats::load(&state, query.refresh)
        .await
        .context("load dashboard statistics")?;
    Ok(Json(stats))
}
