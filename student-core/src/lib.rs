//! Student Core - Record, Validation and Storage
//!
//! TigerStyle: one narrow storage contract, two interchangeable backends.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               Student Core                   │
//! ├─────────────────────────────────────────────┤
//! │  Student / NewStudent   │ Record + rules    │
//! │  StudentStore trait     │ Storage contract  │
//! │  SqliteBackend          │ Embedded file db  │
//! │  PostgresBackend        │ Networked db      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use student_core::{NewStudent, SqliteBackend, StudentStore};
//!
//! let store = SqliteBackend::open("storage/storage.db").await?;
//! let id = store
//!     .create_student(&NewStudent::new("Ann", "ann@x.com", 21))
//!     .await?;
//! let ann = store.get_student_by_id(id).await?;
//! assert_eq!(ann.age, 21);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod constants;
pub mod storage;
pub mod student;

// Re-export common types
pub use constants::*;
pub use storage::{StorageError, StorageResult, StudentStore};
pub use student::{
    FieldError, NewStudent, Student, StudentRequest, UpdateStudentRequest, ValidationErrors,
};

#[cfg(feature = "sqlite")]
pub use storage::SqliteBackend;

#[cfg(feature = "postgres")]
pub use storage::{PostgresBackend, PostgresConfig};
