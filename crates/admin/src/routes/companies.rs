//! Company and service route handlers (read-only).

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use tracing::instrument;

use super::{ListQuery, Listing};
use crate::collection::CollectionFilter;
use crate::error::{AppError, OperationContext};
use crate::middleware::RequireAdminAuth;
use crate::models::CompanyView;
use crate::state::AppState;

/// Build the companies router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/companies", get(index))
}

/// List companies with their services, average ratings and prices.
///
/// GET /api/companies
#[instrument(skip(state, _admin))]
async fn index(
    State(state): State<AppState>,
    _admin: RequireAdminAuth,
    Query(query): Query<ListQuery>,
) -> Result<Json<Listing<CompanyView>>, AppError> {
    let companies = state
        .mirrors()
        .companies
        .load(&state.repo(), query.refresh)
        .await
        .context("load companies")?;

    let items = CollectionFilter::new(query.q.as_deref())
        .apply(&companies)
        .into_iter()
        .map(|keyed| CompanyView::new(keyed.key, keyed.record))
        .collect();
    Ok(Json(Listing::new(companies.len(), items)))
}
