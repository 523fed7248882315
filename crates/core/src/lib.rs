//! Core types and configuration for the position reconciliation system.
//!
//! This crate provides shared types used across all other crates:
//! - Canonical asset, protocol and snapshot types
//! - The comparison dataset written at the end of a run
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::{ChainEntry, Config};
pub use error::{Error, Result};
pub use types::*;
