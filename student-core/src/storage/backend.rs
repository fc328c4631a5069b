//! StudentStore - the storage contract
//!
//! Handlers hold an `Arc<dyn StudentStore>` and never see a concrete backend.

use async_trait::async_trait;

use super::error::StorageResult;
use crate::student::{NewStudent, Student};

/// Capability set every student backend provides.
///
/// Each method is one independent statement; nothing here is atomic across
/// calls. A missing row is always [`StorageError::NotFound`], never a
/// zero-valued success.
///
/// [`StorageError::NotFound`]: super::StorageError::NotFound
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Insert a row and return the backend-assigned id.
    async fn create_student(&self, student: &NewStudent) -> StorageResult<i64>;

    /// Fetch one row.
    async fn get_student_by_id(&self, id: i64) -> StorageResult<Student>;

    /// Fetch every row, ordered by id. Empty table gives an empty vec.
    async fn get_students(&self) -> StorageResult<Vec<Student>>;

    /// Overwrite all mutable fields of a row and return the stored record.
    async fn update_student_by_id(&self, id: i64, student: &NewStudent)
        -> StorageResult<Student>;

    /// Delete a row and return its prior value.
    async fn delete_student_by_id(&self, id: i64) -> StorageResult<Student>;

    /// Release pooled connections. Further calls fail with a connection error.
    async fn close(&self);
}
