//! Storage errors
//!
//! `NotFound` is the one kind callers branch on; everything else is opaque
//! backend failure carrying a message for the logs.

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors returned by a [`StudentStore`](super::StudentStore).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// No row matched the id.
    #[error("no student found with id {id}")]
    NotFound {
        /// The id that was looked up
        id: i64,
    },

    /// Could not open or reach the database.
    #[error("connection error: {0}")]
    Connection(String),

    /// A read statement failed.
    #[error("query error: {0}")]
    Read(String),

    /// A write statement failed.
    #[error("write error: {0}")]
    Write(String),

    /// Schema setup or row decoding failed.
    #[error("internal storage error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Not-found error for `id`.
    #[must_use]
    pub fn not_found(id: i64) -> Self {
        Self::NotFound { id }
    }

    /// Connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Read error.
    pub fn read(message: impl Into<String>) -> Self {
        Self::Read(message.into())
    }

    /// Write error.
    pub fn write(message: impl Into<String>) -> Self {
        Self::Write(message.into())
    }

    /// Internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether this is the distinguished not-found condition.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// =============================================================================
// Driver Error Mapping
// =============================================================================

#[cfg(any(feature = "sqlite", feature = "postgres"))]
impl StorageError {
    /// Map a failed read statement, keeping pool/transport failures apart.
    pub(crate) fn from_read(context: &str, err: sqlx::Error) -> Self {
        if is_connection_failure(&err) {
            Self::connection(format!("{context}: {err}"))
        } else {
            Self::read(format!("{context}: {err}"))
        }
    }

    /// Map a failed write statement, keeping pool/transport failures apart.
    pub(crate) fn from_write(context: &str, err: sqlx::Error) -> Self {
        if is_connection_failure(&err) {
            Self::connection(format!("{context}: {err}"))
        } else {
            Self::write(format!("{context}: {err}"))
        }
    }
}

#[cfg(any(feature = "sqlite", feature = "postgres"))]
fn is_connection_failure(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::PoolClosed
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed
    )
}
