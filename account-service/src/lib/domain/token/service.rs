use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use auth::TokenDigest;
use chrono::Duration;

use crate::domain::clock::Clock;
use crate::domain::errors::with_timeout;
use crate::domain::token::errors::TokenError;
use crate::domain::token::models::Token;
use crate::domain::token::models::TokenScope;
use crate::domain::token::ports::TokenRepository;
use crate::domain::token::ports::TokenServicePort;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;

/// Domain service implementation for scoped tokens.
///
/// Generates random plaintexts, persists only their digests and resolves
/// presented plaintexts back to their owners.
pub struct TokenService<TR>
where
    TR: TokenRepository,
{
    repository: Arc<TR>,
    clock: Arc<dyn Clock>,
    query_timeout: StdDuration,
}

impl<TR> TokenService<TR>
where
    TR: TokenRepository,
{
    /// Create a new token service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Token persistence implementation
    /// * `clock` - Time source for expiry
    /// * `query_timeout` - Upper bound for each repository call
    pub fn new(repository: Arc<TR>, clock: Arc<dyn Clock>, query_timeout: StdDuration) -> Self {
        Self {
            repository,
            clock,
            query_timeout,
        }
    }
}

#[async_trait]
impl<TR> TokenServicePort for TokenService<TR>
where
    TR: TokenRepository,
{
    async fn issue(
        &self,
        user_id: UserId,
        ttl: Duration,
        scope: TokenScope,
    ) -> Result<Token, TokenError> {
        let token = Token::generate(user_id, ttl, scope, self.clock.now())?;

        with_timeout(self.query_timeout, self.repository.insert(&token)).await?;

        tracing::debug!(
            user_id = %user_id,
            scope = %scope,
            expiry = %token.expiry,
            "Token issued"
        );

        Ok(token)
    }

    async fn resolve(&self, scope: TokenScope, plaintext: &str) -> Result<User, TokenError> {
        let hash = TokenDigest::of(plaintext);
        let now = self.clock.now();

        let user = with_timeout(
            self.query_timeout,
            self.repository.find_user_by_token(scope, &hash, now),
        )
        .await?;

        user.ok_or_else(|| {
            tracing::debug!(scope = %scope, "Token did not resolve");
            TokenError::NotFound
        })
    }

    async fn delete_all_for_user(
        &self,
        scope: TokenScope,
        user_id: UserId,
    ) -> Result<(), TokenError> {
        with_timeout(
            self.query_timeout,
            self.repository.delete_all_for_user(scope, user_id),
        )
        .await?;

        tracing::debug!(user_id = %user_id, scope = %scope, "Tokens invalidated");
        Ok(())
    }
}
