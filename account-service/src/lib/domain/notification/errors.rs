use thiserror::Error;

/// Failures reported by a mail transport.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MailerError {
    #[error("Mail transport error: {0}")]
    Transport(String),

    #[error("Mail relay rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Mail delivery timed out")]
    Timeout,

    #[error("Mailer configuration error: {0}")]
    Configuration(String),
}
