use std::fmt;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::rand_core::RngCore;
use base32::Alphabet;
use sha2::Digest;
use sha2::Sha256;

use super::errors::OpaqueTokenError;

/// Number of random bytes behind every token.
const ENTROPY_BYTES: usize = 16;

/// Length of the unpadded base32 rendering of [`ENTROPY_BYTES`].
pub const PLAINTEXT_LEN: usize = 26;

/// A freshly generated bearer token.
///
/// The plaintext is handed to the holder exactly once; only the digest is meant to
/// be stored. `Debug` never prints the plaintext.
pub struct OpaqueToken {
    plaintext: String,
    digest: TokenDigest,
}

impl OpaqueToken {
    /// Generate a new token from the operating system CSPRNG.
    ///
    /// # Errors
    /// * `EntropyUnavailable` - The OS random source failed
    pub fn generate() -> Result<Self, OpaqueTokenError> {
        let mut bytes = [0u8; ENTROPY_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| OpaqueTokenError::EntropyUnavailable(e.to_string()))?;

        let plaintext = base32::encode(Alphabet::RFC4648 { padding: false }, &bytes);
        let digest = TokenDigest::of(&plaintext);

        Ok(Self { plaintext, digest })
    }

    pub fn plaintext(&self) -> &str {
        &self.plaintext
    }

    pub fn digest(&self) -> &TokenDigest {
        &self.digest
    }

    /// Split into plaintext and digest.
    pub fn into_parts(self) -> (String, TokenDigest) {
        (self.plaintext, self.digest)
    }
}

impl fmt::Debug for OpaqueToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpaqueToken")
            .field("plaintext", &"<redacted>")
            .field("digest", &self.digest)
            .finish()
    }
}

/// SHA-256 digest of a token plaintext, used as the storage lookup key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenDigest([u8; 32]);

impl TokenDigest {
    /// Digest a presented plaintext.
    pub fn of(plaintext: &str) -> Self {
        Self(Sha256::digest(plaintext.as_bytes()).into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for TokenDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First four bytes are enough to correlate log lines
        write!(f, "TokenDigest(")?;
        for byte in &self.0[..4] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plaintext_shape() {
        let token = OpaqueToken::generate().unwrap();

        assert_eq!(token.plaintext().len(), PLAINTEXT_LEN);
        assert!(token
            .plaintext()
            .chars()
            .all(|c| c.is_ascii_uppercase() || ('2'..='7').contains(&c)));
    }

    #[test]
    fn test_digest_is_derived_from_plaintext() {
        let token = OpaqueToken::generate().unwrap();

        assert_eq!(*token.digest(), TokenDigest::of(token.plaintext()));
        assert_ne!(*token.digest(), TokenDigest::of("Y3QMGX3PJ3WLRL2YRTQGQ6KRHU"));
    }

    #[test]
    fn test_known_digest() {
        // sha256("abc")
        let digest = TokenDigest::of("abc");
        assert_eq!(digest.as_bytes()[..4], [0xba, 0x78, 0x16, 0xbf]);
    }

    #[test]
    fn test_consecutive_tokens_differ() {
        let first = OpaqueToken::generate().unwrap();
        let second = OpaqueToken::generate().unwrap();

        assert_ne!(first.plaintext(), second.plaintext());
        assert_ne!(first.digest(), second.digest());
    }

    #[test]
    fn test_debug_redacts_plaintext() {
        let token = OpaqueToken::generate().unwrap();
        let rendered = format!("{token:?}");

        assert!(!rendered.contains(token.plaintext()));
        assert!(rendered.contains("<redacted>"));
    }
}
