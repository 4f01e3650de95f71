use async_trait::async_trait;
use serde_json::Value;

use crate::domain::notification::errors::MailerError;

/// Port for outbound email delivery.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Send one templated email.
    ///
    /// # Arguments
    /// * `recipient` - Destination address
    /// * `template_id` - Template known to the transport
    /// * `data` - Values substituted into the template
    ///
    /// # Errors
    /// * `Transport` - The relay could not be reached
    /// * `Rejected` - The relay refused the message
    /// * `Timeout` - Delivery exceeded the transport deadline
    async fn send(&self, recipient: &str, template_id: &str, data: &Value)
        -> Result<(), MailerError>;
}
