//! Storage - Backend Trait and Implementations
//!
//! TigerStyle: One narrow contract, every backend honors it uniformly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     StudentStore Trait                       │
//! └─────────────────────────────────────────────────────────────┘
//!          ↑                              ↑
//!          │                              │
//! ┌────────┴────────┐           ┌────────┴────────┐
//! │  SqliteBackend  │           │ PostgresBackend │
//! │ (embedded file) │           │   (networked)   │
//! └─────────────────┘           └─────────────────┘
//! ```
//!
//! Both backends run the same conformance suite
//! (`student-core/tests/conformance.rs`).

mod backend;
mod error;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "postgres")]
mod postgres;

pub use backend::StudentStore;
pub use error::{StorageError, StorageResult};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteBackend;

#[cfg(feature = "postgres")]
pub use postgres::{PostgresBackend, PostgresConfig};
