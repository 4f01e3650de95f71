//! Credential primitives library
//!
//! Provides the cryptographic building blocks of account management:
//! - Password hashing (Argon2id)
//! - Signed session tokens (JWT, HS256) with issuer/audience checks
//! - Opaque bearer tokens stored only as a SHA-256 digest
//! - Authentication coordination
//!
//! Nothing here knows about users or storage; services adapt these types behind
//! their own ports.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Session Tokens
//! ```
//! use auth::{Claims, JwtHandler};
//! use chrono::{Duration, Utc};
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!")
//!     .unwrap()
//!     .with_issuer("accounts")
//!     .with_audience("accounts");
//! let claims = Claims::for_session(42, "accounts", "accounts", Utc::now(), Duration::hours(24));
//! let token = handler.encode(&claims).unwrap();
//! let decoded: Claims = handler.decode(&token).unwrap();
//! assert_eq!(decoded.sub.as_deref(), Some("42"));
//! ```
//!
//! ## Opaque Tokens
//! ```
//! use auth::{OpaqueToken, TokenDigest};
//!
//! let token = OpaqueToken::generate().unwrap();
//! // Persist only the digest; mail the plaintext.
//! assert_eq!(*token.digest(), TokenDigest::of(token.plaintext()));
//! ```

pub mod authenticator;
pub mod jwt;
pub mod opaque;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use opaque::OpaqueToken;
pub use opaque::OpaqueTokenError;
pub use opaque::TokenDigest;
pub use password::PasswordError;
pub use password::PasswordHasher;
