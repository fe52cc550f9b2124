//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! POST   /auth/login                    - Sign in with email and password
//! POST   /auth/logout                   - Sign out
//! GET    /auth/session                  - Current admin, or 401
//!
//! # Dashboard
//! GET    /api/dashboard                 - Headline statistics
//!
//! # Collections (?q= free text, ?refresh=true reloads the mirror)
//! GET    /api/users                     - List users
//! DELETE /api/users/{id}                - Delete a user
//! GET    /api/companies                 - List companies with their services
//! GET    /api/bookings                  - List bookings (?status=all|pending|completed|absent|none)
//! PATCH  /api/bookings/{id}/status      - Set a booking's status
//! GET    /api/messages                  - List messages
//! GET    /api/messages/{id}             - Show a message
//! DELETE /api/messages/{id}             - Delete a message
//!
//! # Banners (multipart: title, description, link, active, image)
//! GET    /api/banners                   - List banners
//! POST   /api/banners                   - Create a banner
//! PUT    /api/banners/{id}              - Edit a banner
//! POST   /api/banners/{id}/toggle       - Flip a banner's active flag
//! DELETE /api/banners/{id}              - Delete a banner and its image
//!
//! # FAQs
//! GET    /api/faqs                      - Both categories
//! POST   /api/faqs/{category}           - Append an entry
//! PUT    /api/faqs/{category}/{index}   - Edit an entry
//! DELETE /api/faqs/{category}/{index}   - Remove an entry
//!
//! # Account
//! GET    /api/account                   - Admin account records
//! POST   /api/account/password          - Change the signed-in admin's password
//! ```
//!
//! Every `/api/*` handler takes [`RequireAdminAuth`](crate::middleware::RequireAdminAuth).

pub mod account;
pub mod auth;
pub mod banners;
pub mod bookings;
pub mod companies;
pub mod dashboard;
pub mod faqs;
pub mod messages;
pub mod users;

use axum::Router;
use serde::{Deserialize, Serialize};

use taskmaster_core::RecordKey;

use crate::error::AppError;
use crate::state::AppState;

/// Build the complete route tree.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(users::router())
        .merge(companies::router())
        .merge(bookings::router())
        .merge(messages::router())
        .merge(banners::router())
        .merge(faqs::router())
        .merge(account::router())
}

/// Query parameters shared by collection listings.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Free-text filter.
    pub q: Option<String>,
    /// Reload the collection from the store.
    #[serde(default)]
    pub refresh: bool,
}

/// A filtered collection listing.
#[derive(Debug, Serialize)]
pub struct Listing<T> {
    /// Records in the collection before filtering.
    pub total: usize,
    /// Records after filtering.
    pub count: usize,
    pub items: Vec<T>,
}

impl<T> Listing<T> {
    /// Wrap filtered items taken from a collection of `total` records.
    #[must_use]
    pub fn new(total: usize, items: Vec<T>) -> Self {
        Self {
            total,
            count: items.len(),
            items,
        }
    }
}

/// Parse a record key from a path segment.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if the segment is not a valid key.
pub fn parse_key<K: RecordKey>(raw: &str) -> Result<K, AppError> {
    K::parse(raw).map_err(|e| AppError::BadRequest(format!("Invalid id: {e}")))
}
