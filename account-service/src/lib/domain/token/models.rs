use std::fmt;

use auth::OpaqueToken;
use auth::OpaqueTokenError;
use auth::TokenDigest;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::domain::user::models::UserId;

/// Purpose a scoped token may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenScope {
    Activation,
    PasswordReset,
    /// Reserved for stateful sessions; login currently issues signed tokens.
    Authentication,
}

impl TokenScope {
    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenScope::Activation => "activation",
            TokenScope::PasswordReset => "password-reset",
            TokenScope::Authentication => "authentication",
        }
    }
}

impl fmt::Display for TokenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single-use, scoped, time-bounded capability granted to a user.
///
/// Only `hash` is persisted; `plaintext` exists solely in the value returned at
/// issuance.
#[derive(Clone)]
pub struct Token {
    pub plaintext: String,
    pub hash: TokenDigest,
    pub user_id: UserId,
    pub scope: TokenScope,
    pub expiry: DateTime<Utc>,
}

impl Token {
    /// Mint a fresh token for `user_id` valid for `ttl` from `now`.
    ///
    /// # Errors
    /// * `EntropyUnavailable` - The OS random source failed
    pub fn generate(
        user_id: UserId,
        ttl: Duration,
        scope: TokenScope,
        now: DateTime<Utc>,
    ) -> Result<Self, OpaqueTokenError> {
        let (plaintext, hash) = OpaqueToken::generate()?.into_parts();

        Ok(Self {
            plaintext,
            hash,
            user_id,
            scope,
            expiry: now + ttl,
        })
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("plaintext", &"<redacted>")
            .field("hash", &self.hash)
            .field("user_id", &self.user_id)
            .field("scope", &self.scope)
            .field("expiry", &self.expiry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_generate_sets_expiry_and_digest() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
        let token =
            Token::generate(UserId(7), Duration::hours(24), TokenScope::PasswordReset, now)
                .unwrap();

        assert_eq!(token.expiry, now + Duration::hours(24));
        assert_eq!(token.hash, TokenDigest::of(&token.plaintext));
        assert_eq!(token.user_id, UserId(7));
        assert_eq!(token.scope, TokenScope::PasswordReset);
    }

    #[test]
    fn test_scope_storage_names() {
        assert_eq!(TokenScope::Activation.as_str(), "activation");
        assert_eq!(TokenScope::PasswordReset.as_str(), "password-reset");
        assert_eq!(TokenScope::Authentication.to_string(), "authentication");
    }
}
