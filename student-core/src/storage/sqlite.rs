//! SqliteBackend - Embedded File Storage
//!
//! TigerStyle: Same contract as Postgres, one database file on local disk.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS students (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     name TEXT NOT NULL,
//!     email TEXT NOT NULL,
//!     age INTEGER NOT NULL
//! );
//! ```
//!
//! `AUTOINCREMENT` keeps ids from being reused after a delete.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::Row;

use super::backend::StudentStore;
use super::error::{StorageError, StorageResult};
use crate::constants::{POOL_ACQUIRE_TIMEOUT_SECS_DEFAULT, POOL_CONNECTIONS_COUNT_DEFAULT};
use crate::student::{NewStudent, Student};

/// SQLite student backend.
pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    /// Open (creating if missing) the database file at `path`.
    ///
    /// Parent directories are created as needed.
    ///
    /// # Errors
    /// Returns error if the file cannot be opened or the table cannot be created.
    pub async fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::open_with_timeout(
            path,
            Duration::from_secs(POOL_ACQUIRE_TIMEOUT_SECS_DEFAULT),
        )
        .await
    }

    /// Like [`open`](Self::open) with an explicit pool acquire timeout.
    ///
    /// # Errors
    /// Returns error if the file cannot be opened or the table cannot be created.
    pub async fn open_with_timeout(
        path: impl AsRef<Path>,
        acquire_timeout: Duration,
    ) -> StorageResult<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(StorageError::connection("storage path cannot be empty"));
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::connection(format!(
                    "failed to create directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(acquire_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(POOL_CONNECTIONS_COUNT_DEFAULT)
            .acquire_timeout(acquire_timeout)
            .connect_with(options)
            .await
            .map_err(|e| {
                StorageError::connection(format!("failed to open {}: {e}", path.display()))
            })?;

        tracing::debug!(path = %path.display(), "opened sqlite database");
        Self::from_pool(pool).await
    }

    /// Open a private in-memory database.
    ///
    /// The pool is pinned to a single long-lived connection; a second
    /// connection would see a different, empty database.
    ///
    /// # Errors
    /// Returns error if the database cannot be created.
    pub async fn in_memory() -> StorageResult<Self> {
        let options: SqliteConnectOptions = "sqlite::memory:"
            .parse()
            .map_err(|e| StorageError::internal(format!("invalid memory url: {e}")))?;

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::connection(format!("failed to open memory db: {e}")))?;

        Self::from_pool(pool).await
    }

    /// Create from an existing pool.
    ///
    /// # Errors
    /// Returns error if the table cannot be created.
    pub async fn from_pool(pool: SqlitePool) -> StorageResult<Self> {
        let backend = Self { pool };
        backend.init_schema().await?;
        Ok(backend)
    }

    async fn init_schema(&self) -> StorageResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS students (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                age INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::internal(format!("failed to create schema: {e}")))?;

        Ok(())
    }

    /// Get the connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Delete every row. The autoincrement counter is kept.
    ///
    /// # Errors
    /// Returns error if the statement fails.
    pub async fn clear(&self) -> StorageResult<()> {
        sqlx::query("DELETE FROM students")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::from_write("failed to clear students", e))?;
        Ok(())
    }
}

fn row_to_student(row: &SqliteRow) -> StorageResult<Student> {
    let decode = |e: sqlx::Error| StorageError::internal(format!("failed to decode row: {e}"));
    Ok(Student {
        id: row.try_get("id").map_err(decode)?,
        name: row.try_get("name").map_err(decode)?,
        email: row.try_get("email").map_err(decode)?,
        age: row.try_get("age").map_err(decode)?,
    })
}

#[async_trait]
impl StudentStore for SqliteBackend {
    async fn create_student(&self, student: &NewStudent) -> StorageResult<i64> {
        let result = sqlx::query("INSERT INTO students (name, email, age) VALUES (?, ?, ?)")
            .bind(&student.name)
            .bind(&student.email)
            .bind(student.age)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::from_write("failed to create student", e))?;

        let id = result.last_insert_rowid();
        assert!(id > 0, "rowids start at 1");
        Ok(id)
    }

    async fn get_student_by_id(&self, id: i64) -> StorageResult<Student> {
        let row = sqlx::query("SELECT id, name, email, age FROM students WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::from_read("failed to get student", e))?;

        let Some(row) = row else {
            return Err(StorageError::not_found(id));
        };
        row_to_student(&row)
    }

    async fn get_students(&self) -> StorageResult<Vec<Student>> {
        let rows = sqlx::query("SELECT id, name, email, age FROM students ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::from_read("failed to list students", e))?;

        rows.iter().map(row_to_student).collect()
    }

    async fn update_student_by_id(
        &self,
        id: i64,
        student: &NewStudent,
    ) -> StorageResult<Student> {
        // Drain every row: SQLite commits only once the statement has run to
        // completion, and a half-read cursor would go back to the pool open.
        let rows = sqlx::query(
            r#"
            UPDATE students SET name = ?, email = ?, age = ?
            WHERE id = ?
            RETURNING id, name, email, age
            "#,
        )
        .bind(&student.name)
        .bind(&student.email)
        .bind(student.age)
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::from_write("failed to update student", e))?;

        let Some(row) = rows.into_iter().next() else {
            return Err(StorageError::not_found(id));
        };
        row_to_student(&row)
    }

    async fn delete_student_by_id(&self, id: i64) -> StorageResult<Student> {
        let rows = sqlx::query("DELETE FROM students WHERE id = ? RETURNING id, name, email, age")
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::from_write("failed to delete student", e))?;

        let Some(row) = rows.into_iter().next() else {
            return Err(StorageError::not_found(id));
        };
        row_to_student(&row)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
