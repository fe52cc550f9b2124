//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - Email/password sign-in and password rotation
//! - `banners` - Banner records plus their images in the blob store
//! - `dashboard` - Headline statistics across collections
//! - `faqs` - Hardware and software FAQ lists

pub mod auth;
pub mod banners;
pub mod dashboard;
pub mod faqs;

pub use auth::{AdminAuthError, AdminAuthService, PasswordChange, PasswordChangeOutcome};
pub use banners::{BannerError, BannerImage, BannerInput, BannerService};
pub use dashboard::DashboardStats;
pub use faqs::{FaqCatalog, FaqError, FaqService};
