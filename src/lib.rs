//! Student API - CRUD over a single student record
//!
//! A small HTTP service in front of the `student-core` storage contract.
//!
//! Features:
//! - Two interchangeable backends (SQLite file, PostgreSQL) chosen by config
//! - Field validation with per-field error reporting
//! - Distinct 400 / 404 / 500 mapping driven by typed errors
//! - Graceful shutdown with a bounded grace period

pub mod api;
pub mod config;
pub mod server;

// =============================================================================
// TigerStyle Constants
// =============================================================================

/// Default HTTP bind address
pub const HTTP_BIND_ADDRESS_DEFAULT: &str = "127.0.0.1:8082";

/// Application name
pub const APP_NAME: &str = "student-api";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
