use std::env;
use std::fmt;
use std::time::Duration as StdDuration;

use auth::jwt::MIN_SECRET_BYTES;
use chrono::Duration;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::domain::session::models::SessionSettings;
use crate::domain::user::service::TokenLifetimes;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub tokens: TokensConfig,
    pub password: PasswordConfig,
    pub mailer: MailerConfig,
    pub notifications: NotificationsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub query_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: Secret,
    pub expiration_hours: i64,
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TokensConfig {
    pub activation_ttl_hours: i64,
    pub password_reset_ttl_hours: i64,
}

/// Lowest accepted Argon2id memory cost, in KiB.
pub const MIN_PASSWORD_MEMORY_KIB: u32 = 19456;

/// Lowest accepted Argon2id iteration count.
pub const MIN_PASSWORD_ITERATIONS: u32 = 2;

/// Argon2id work factor.
#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailerConfig {
    pub endpoint: String,
    pub api_key: Secret,
    pub sender: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationsConfig {
    pub max_in_flight: usize,
    pub max_queued: usize,
}

/// A configuration value that must never be printed.
#[derive(Clone, Deserialize)]
#[serde(from = "String")]
pub struct Secret(String);

impl Secret {
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    /// 4. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let builder = Self::with_defaults(ConfigBuilder::builder())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::default().separator("__"));

        Self::from_builder(builder)
    }

    /// Finish a builder into a validated configuration.
    pub fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults for everything except the database URL and secrets.
    pub fn with_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            .set_default("database.max_connections", 5)?
            .set_default("database.query_timeout_secs", 3)?
            .set_default("server.http_port", 4000)?
            .set_default("jwt.expiration_hours", 24)?
            .set_default("jwt.issuer", "accounts")?
            .set_default("jwt.audience", "accounts")?
            .set_default("tokens.activation_ttl_hours", 24)?
            .set_default("tokens.password_reset_ttl_hours", 24)?
            .set_default("password.memory_kib", 19456)?
            .set_default("password.iterations", 2)?
            .set_default("password.parallelism", 1)?
            .set_default("notifications.max_in_flight", 16)?
            .set_default("notifications.max_queued", 1024)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let secret_len = self.jwt.secret.as_bytes().len();
        if secret_len < MIN_SECRET_BYTES {
            return Err(ConfigError::Message(format!(
                "jwt.secret must be at least {} bytes, got {}",
                MIN_SECRET_BYTES, secret_len
            )));
        }

        if self.database.query_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "database.query_timeout_secs must be positive".to_string(),
            ));
        }

        if self.password.memory_kib < MIN_PASSWORD_MEMORY_KIB
            || self.password.iterations < MIN_PASSWORD_ITERATIONS
            || self.password.parallelism == 0
        {
            return Err(ConfigError::Message(format!(
                "password work factor must be at least {} KiB, {} iterations and 1 lane",
                MIN_PASSWORD_MEMORY_KIB, MIN_PASSWORD_ITERATIONS
            )));
        }

        if self.jwt.expiration_hours <= 0 {
            return Err(ConfigError::Message(
                "jwt.expiration_hours must be positive".to_string(),
            ));
        }

        if self.tokens.activation_ttl_hours <= 0 || self.tokens.password_reset_ttl_hours <= 0 {
            return Err(ConfigError::Message(
                "token lifetimes must be positive".to_string(),
            ));
        }

        Ok(())
    }

    pub fn query_timeout(&self) -> StdDuration {
        StdDuration::from_secs(self.database.query_timeout_secs)
    }

    pub fn token_lifetimes(&self) -> TokenLifetimes {
        TokenLifetimes {
            activation: Duration::hours(self.tokens.activation_ttl_hours),
            password_reset: Duration::hours(self.tokens.password_reset_ttl_hours),
        }
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            issuer: self.jwt.issuer.clone(),
            audience: self.jwt.audience.clone(),
            ttl: Duration::hours(self.jwt.expiration_hours),
        }
    }
}
