use thiserror::Error;

/// Error type for opaque token generation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OpaqueTokenError {
    #[error("Operating system entropy source unavailable: {0}")]
    EntropyUnavailable(String),
}
