//! HTTP middleware for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request spans with status and latency)
//! 3. Session layer (tower-sessions, in-memory store)
//! 4. Auth extractors on `/api/*` and `/auth/session` handlers

pub mod auth;
pub mod session;

pub use auth::{
    AdminAuthRejection, OptionalAdminAuth, RequireAdminAuth, clear_current_admin,
    set_current_admin,
};
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
