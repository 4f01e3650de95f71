pub mod token;
pub mod user;

pub use token::PostgresTokenRepository;
pub use user::PostgresUserRepository;

use crate::domain::errors::PersistenceError;

pub(crate) fn database_error(e: sqlx::Error) -> PersistenceError {
    PersistenceError::Database(e.to_string())
}
