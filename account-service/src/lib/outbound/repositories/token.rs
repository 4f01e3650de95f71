use async_trait::async_trait;
use auth::TokenDigest;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;

use super::database_error;
use super::user::UserRow;
use super::user::USER_COLUMNS;
use crate::domain::errors::PersistenceError;
use crate::domain::token::models::Token;
use crate::domain::token::models::TokenScope;
use crate::domain::token::ports::TokenRepository;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;

/// Token table access. Rows hold the SHA-256 digest of a token, never its plaintext.
pub struct PostgresTokenRepository {
    pool: PgPool,
}

impl PostgresTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenRepository for PostgresTokenRepository {
    async fn insert(&self, token: &Token) -> Result<(), PersistenceError> {
        sqlx::query(
            r#"
            INSERT INTO tokens (hash, user_id, expiry, scope)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(token.hash.as_bytes().as_slice())
        .bind(token.user_id.0)
        .bind(token.expiry)
        .bind(token.scope.as_str())
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(())
    }

    async fn find_user_by_token(
        &self,
        scope: TokenScope,
        hash: &TokenDigest,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, PersistenceError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            INNER JOIN tokens ON users.id = tokens.user_id
            WHERE tokens.hash = $1
            AND tokens.scope = $2
            AND tokens.expiry > $3
            "#
        ))
        .bind(hash.as_bytes().as_slice())
        .bind(scope.as_str())
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.map(User::try_from).transpose()
    }

    async fn delete_all_for_user(
        &self,
        scope: TokenScope,
        user_id: UserId,
    ) -> Result<(), PersistenceError> {
        let result = sqlx::query(
            r#"
            DELETE FROM tokens
            WHERE scope = $1 AND user_id = $2
            "#,
        )
        .bind(scope.as_str())
        .bind(user_id.0)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        tracing::debug!(
            user_id = %user_id,
            scope = %scope,
            deleted = result.rows_affected(),
            "Deleted tokens"
        );

        Ok(())
    }
}
