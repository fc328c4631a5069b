//! TigerStyle Constants
//!
//! Limits are named with the unit last: `*_BYTES_MAX`, `*_COUNT_MAX`.

/// Maximum student name length in bytes
pub const STUDENT_NAME_BYTES_MAX: usize = 256;

/// Maximum email length in bytes (RFC 5321 path limit)
pub const STUDENT_EMAIL_BYTES_MAX: usize = 254;

/// Minimum accepted age
pub const STUDENT_AGE_MIN: i64 = 1;

/// Maximum accepted age
pub const STUDENT_AGE_MAX: i64 = 150;

/// Default number of pooled connections for file and network backends
pub const POOL_CONNECTIONS_COUNT_DEFAULT: u32 = 10;

/// Default time to wait for a pooled connection, in seconds
pub const POOL_ACQUIRE_TIMEOUT_SECS_DEFAULT: u64 = 5;
