use std::fmt;

use serde_json::Value;

/// Email templates known to the mail relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    UserWelcome,
    TokenActivation,
    TokenPasswordReset,
}

impl Template {
    /// Identifier the relay resolves to a rendered template.
    pub fn id(&self) -> &'static str {
        match self {
            Template::UserWelcome => "user_welcome",
            Template::TokenActivation => "token_activation",
            Template::TokenPasswordReset => "token_password_reset",
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// An owned snapshot of everything needed to send one email.
///
/// `data` usually carries a token plaintext, so `Debug` only lists its keys.
#[derive(Clone)]
pub struct Notification {
    pub recipient: String,
    pub template: Template,
    pub data: Value,
}

impl Notification {
    pub fn new(recipient: impl Into<String>, template: Template, data: Value) -> Self {
        Self {
            recipient: recipient.into(),
            template,
            data,
        }
    }
}

impl fmt::Debug for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = match &self.data {
            Value::Object(map) => map.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        };

        f.debug_struct("Notification")
            .field("recipient", &self.recipient)
            .field("template", &self.template)
            .field("data_keys", &keys)
            .finish()
    }
}
