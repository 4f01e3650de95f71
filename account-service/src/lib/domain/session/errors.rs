use thiserror::Error;

use crate::domain::errors::PersistenceError;
use crate::domain::validation::ValidationErrors;
use crate::user::errors::UserError;

/// Errors of login and session token verification.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Unknown email and wrong password both end up here.
    #[error("Invalid authentication credentials")]
    InvalidCredentials,

    #[error("Invalid or expired authentication token")]
    InvalidToken,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl From<ValidationErrors> for SessionError {
    fn from(errors: ValidationErrors) -> Self {
        SessionError::Validation(errors)
    }
}

impl From<UserError> for SessionError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Validation(errors) => SessionError::Validation(errors),
            UserError::Persistence(e) => SessionError::Persistence(e),
            other => SessionError::Internal(other.to_string()),
        }
    }
}
