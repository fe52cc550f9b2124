//! CLI subcommands.

pub mod config;
pub mod seed;
pub mod stats;
