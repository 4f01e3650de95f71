use auth::OpaqueTokenError;
use thiserror::Error;

use crate::domain::errors::PersistenceError;

/// Errors of the scoped token store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    /// No live token with that scope and digest. Absent and expired tokens are
    /// deliberately indistinguishable.
    #[error("Token not found")]
    NotFound,

    #[error("Token generation failed: {0}")]
    Generation(#[from] OpaqueTokenError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
