pub mod errors;
pub mod token;

pub use errors::OpaqueTokenError;
pub use token::OpaqueToken;
pub use token::TokenDigest;
pub use token::PLAINTEXT_LEN;
