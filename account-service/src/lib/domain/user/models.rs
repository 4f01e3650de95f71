use std::fmt;

use auth::PasswordError;
use auth::PasswordHasher;
use chrono::DateTime;
use chrono::Utc;

use crate::user::errors::UserIdError;

/// User aggregate entity.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub email: String,
    pub password: Credential,
    pub activated: bool,
    /// Optimistic concurrency version, bumped by every update
    pub version: i32,
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub i64);

impl UserId {
    /// Parse a user ID from string.
    ///
    /// # Arguments
    /// * `s` - Decimal identifier, as carried in a session token subject
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a decimal integer
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        s.parse::<i64>()
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One-way hash of a user's password.
///
/// Only two ways in: hashing an owned plaintext, which is dropped as soon as the
/// hash exists, or loading a non-empty stored hash. A `Credential` therefore
/// always holds a hash.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    hash: String,
}

impl Credential {
    /// Hash `plaintext` into a new credential.
    ///
    /// # Errors
    /// * `HashingFailed` - The hasher failed internally
    pub fn set(hasher: &PasswordHasher, plaintext: String) -> Result<Self, PasswordError> {
        let hash = hasher.hash(&plaintext)?;
        drop(plaintext);
        Ok(Self { hash })
    }

    /// Wrap a hash read back from storage.
    ///
    /// # Errors
    /// * `MalformedHash` - The stored hash is empty
    pub fn from_stored(hash: String) -> Result<Self, PasswordError> {
        if hash.trim().is_empty() {
            return Err(PasswordError::MalformedHash(
                "missing password hash".to_string(),
            ));
        }
        Ok(Self { hash })
    }

    /// PHC string, for persistence and verification.
    pub fn as_str(&self) -> &str {
        &self.hash
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Insertion payload for a user that has no identifier yet.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: Credential,
    pub activated: bool,
}

/// Command to register a new user.
///
/// Holds the plaintext password only until the service has validated and
/// hashed it.
pub struct RegisterUserCommand {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterUserCommand {
    pub fn new(name: String, email: String, password: String) -> Self {
        Self {
            name,
            email,
            password,
        }
    }
}

impl fmt::Debug for RegisterUserCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterUserCommand")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
