use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use reqwest::header::ACCEPT;
use serde::Serialize;
use serde_json::Value;

use crate::config::MailerConfig;
use crate::domain::notification::errors::MailerError;
use crate::domain::notification::ports::Mailer;

const SEND_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct SendEmailBody<'a> {
    sender: &'a str,
    to: &'a str,
    template: &'a str,
    data: &'a Value,
}

/// Mailer posting templated messages to an HTTP mail relay.
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    sender: String,
}

impl HttpMailer {
    /// Build a client for the relay described by `config`.
    ///
    /// # Errors
    /// * `Configuration` - API key is not a valid header value or the client could not be built
    pub fn new(config: &MailerConfig) -> Result<Self, MailerError> {
        let mut api_key = HeaderValue::from_str(config.api_key.expose())
            .map_err(|e| MailerError::Configuration(format!("invalid api key: {}", e)))?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("api-key", api_key);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(SEND_TIMEOUT)
            .build()
            .map_err(|e| MailerError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            sender: config.sender.clone(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(
        &self,
        recipient: &str,
        template_id: &str,
        data: &Value,
    ) -> Result<(), MailerError> {
        let body = SendEmailBody {
            sender: &self.sender,
            to: recipient,
            template: template_id,
            data,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MailerError::Timeout
                } else {
                    MailerError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(recipient = %recipient, template = template_id, "Email sent");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(MailerError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
