//! TaskMaster Core - Shared types library.
//!
//! This crate provides common types used across all TaskMaster components:
//! - `admin` - Staff administration service for the marketplace
//! - `cli` - Command-line tools for seeding and inspecting the document store
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no network access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Record keys, emails, prices and status enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
