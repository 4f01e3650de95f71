use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

/// A signed session token handed to the client after login.
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Claims placed in every session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            issuer: "accounts".to_string(),
            audience: "accounts".to_string(),
            ttl: Duration::hours(24),
        }
    }
}
