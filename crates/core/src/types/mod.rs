//! Core types for TaskMaster.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod key;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use key::*;
pub use price::{CurrencyCode, Price};
pub use status::*;
