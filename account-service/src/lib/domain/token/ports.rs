use async_trait::async_trait;
use auth::TokenDigest;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::domain::errors::PersistenceError;
use crate::domain::token::errors::TokenError;
use crate::domain::token::models::Token;
use crate::domain::token::models::TokenScope;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;

/// Port for the scoped token store.
#[async_trait]
pub trait TokenServicePort: Send + Sync + 'static {
    /// Issue a new token.
    ///
    /// # Arguments
    /// * `user_id` - Owner of the token
    /// * `ttl` - Lifetime from now
    /// * `scope` - Purpose the token authorizes
    ///
    /// # Returns
    /// The token, including the only copy of its plaintext
    ///
    /// # Errors
    /// * `Generation` - Random source failed
    /// * `Persistence` - Token could not be stored; nothing was issued
    async fn issue(
        &self,
        user_id: UserId,
        ttl: Duration,
        scope: TokenScope,
    ) -> Result<Token, TokenError>;

    /// Resolve a presented plaintext to the user owning it.
    ///
    /// # Arguments
    /// * `scope` - Scope the token must have been issued with
    /// * `plaintext` - Token as presented by the holder
    ///
    /// # Returns
    /// The owning user
    ///
    /// # Errors
    /// * `NotFound` - No unexpired token with this scope and plaintext
    /// * `Persistence` - Storage failure
    async fn resolve(&self, scope: TokenScope, plaintext: &str) -> Result<User, TokenError>;

    /// Invalidate every outstanding token of `scope` for a user.
    ///
    /// # Errors
    /// * `Persistence` - Storage failure
    async fn delete_all_for_user(
        &self,
        scope: TokenScope,
        user_id: UserId,
    ) -> Result<(), TokenError>;
}

/// Persistence operations for scoped tokens.
#[async_trait]
pub trait TokenRepository: Send + Sync + 'static {
    /// Store the digest, owner, scope and expiry of a token.
    ///
    /// # Errors
    /// * `Database` - Insert failed
    async fn insert(&self, token: &Token) -> Result<(), PersistenceError>;

    /// Find the user owning a token.
    ///
    /// # Arguments
    /// * `scope` - Required scope
    /// * `hash` - Digest of the presented plaintext
    /// * `now` - Tokens with `expiry <= now` never match
    ///
    /// # Returns
    /// Optional user (None if no live token matches)
    ///
    /// # Errors
    /// * `Database` - Query failed
    /// * `Integrity` - Owning user row is corrupted
    async fn find_user_by_token(
        &self,
        scope: TokenScope,
        hash: &TokenDigest,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, PersistenceError>;

    /// Remove every token of `scope` owned by `user_id`.
    ///
    /// # Errors
    /// * `Database` - Delete failed
    async fn delete_all_for_user(
        &self,
        scope: TokenScope,
        user_id: UserId,
    ) -> Result<(), PersistenceError>;
}
