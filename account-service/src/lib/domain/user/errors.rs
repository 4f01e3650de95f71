use auth::PasswordError;
use thiserror::Error;

use crate::domain::errors::PersistenceError;
use crate::domain::token::errors::TokenError;
use crate::domain::user::models::UserId;
use crate::domain::validation::ValidationErrors;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid user id: {0}")]
    InvalidFormat(String),
}

/// Top-level error for all user-related operations
#[derive(Debug, Clone, Error)]
pub enum UserError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    // Domain-level errors
    #[error("User not found")]
    NotFound,

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("User {0} was modified concurrently")]
    EditConflict(UserId),

    // Infrastructure errors
    #[error("Credential error: {0}")]
    Credential(#[from] PasswordError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl From<ValidationErrors> for UserError {
    fn from(errors: ValidationErrors) -> Self {
        UserError::Validation(errors)
    }
}

impl From<TokenError> for UserError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::NotFound => UserError::NotFound,
            TokenError::Persistence(e) => UserError::Persistence(e),
            TokenError::Generation(e) => UserError::Internal(e.to_string()),
        }
    }
}
