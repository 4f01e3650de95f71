use async_trait::async_trait;

use crate::domain::session::errors::SessionError;
use crate::domain::session::models::SessionToken;
use crate::domain::user::models::UserId;

/// Port for stateless session authentication.
#[async_trait]
pub trait SessionServicePort: Send + Sync + 'static {
    /// Exchange an email and password for a signed session token.
    ///
    /// # Arguments
    /// * `email` - Registered email address
    /// * `password` - Plaintext password
    ///
    /// # Returns
    /// Signed token with its expiry
    ///
    /// # Errors
    /// * `Validation` - Malformed email or password
    /// * `InvalidCredentials` - Unknown email or wrong password
    /// * `Internal` - Corrupted stored credential or signing failure
    /// * `Persistence` - Database operation failed
    async fn authenticate(&self, email: &str, password: &str)
        -> Result<SessionToken, SessionError>;

    /// Check a presented session token and extract its subject.
    ///
    /// # Errors
    /// * `InvalidToken` - Bad signature, issuer, audience or validity window
    fn verify(&self, token: &str) -> Result<UserId, SessionError>;
}
