use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// Storage-layer faults shared by every repository port.
///
/// None of these are correctable by the caller; they surface to clients as an
/// opaque server error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    /// A stored record violates an invariant, e.g. a user row without a password hash.
    #[error("Stored record is corrupted: {0}")]
    Integrity(String),
}

/// Bound a repository call by `limit`.
///
/// The operation is dropped when the limit elapses, which cancels the
/// underlying query, and the call fails with [`PersistenceError::Timeout`].
pub async fn with_timeout<T, E, F>(limit: Duration, operation: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: From<PersistenceError>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(timeout_ms = limit.as_millis() as u64, "Database operation timed out");
            Err(PersistenceError::Timeout(limit).into())
        }
    }
}
