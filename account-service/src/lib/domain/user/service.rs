use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use auth::PasswordHasher;
use chrono::Duration;
use serde_json::json;

use crate::domain::errors::with_timeout;
use crate::domain::notification::dispatcher::NotificationDispatcher;
use crate::domain::notification::models::Notification;
use crate::domain::notification::models::Template;
use crate::domain::notification::ports::Mailer;
use crate::domain::token::errors::TokenError;
use crate::domain::token::models::TokenScope;
use crate::domain::token::ports::TokenServicePort;
use crate::domain::user::models::Credential;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::validation::validate_email;
use crate::domain::user::validation::validate_password_plaintext;
use crate::domain::user::validation::validate_registration;
use crate::domain::user::validation::validate_token_plaintext;
use crate::domain::validation::ValidationErrors;
use crate::domain::validation::Validator;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

const DEFAULT_QUERY_TIMEOUT: StdDuration = StdDuration::from_secs(3);

/// How long each kind of emailed token stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub activation: Duration,
    pub password_reset: Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            activation: Duration::hours(24),
            password_reset: Duration::hours(24),
        }
    }
}

/// Domain service implementation for user account flows.
pub struct UserService<UR, TS, M>
where
    UR: UserRepository,
    TS: TokenServicePort,
    M: Mailer,
{
    repository: Arc<UR>,
    tokens: Arc<TS>,
    mailer: Arc<M>,
    dispatcher: NotificationDispatcher,
    password_hasher: PasswordHasher,
    lifetimes: TokenLifetimes,
    query_timeout: StdDuration,
}

impl<UR, TS, M> UserService<UR, TS, M>
where
    UR: UserRepository,
    TS: TokenServicePort,
    M: Mailer,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `tokens` - Scoped token store
    /// * `mailer` - Email transport used by background notifications
    /// * `dispatcher` - Background task runner for notifications
    /// * `password_hasher` - Hasher with the configured work factor
    ///
    /// # Returns
    /// Configured user service instance
    pub fn new(
        repository: Arc<UR>,
        tokens: Arc<TS>,
        mailer: Arc<M>,
        dispatcher: NotificationDispatcher,
        password_hasher: PasswordHasher,
    ) -> Self {
        Self {
            repository,
            tokens,
            mailer,
            dispatcher,
            password_hasher,
            lifetimes: TokenLifetimes::default(),
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    pub fn with_token_lifetimes(mut self, lifetimes: TokenLifetimes) -> Self {
        self.lifetimes = lifetimes;
        self
    }

    pub fn with_query_timeout(mut self, query_timeout: StdDuration) -> Self {
        self.query_timeout = query_timeout;
        self
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        with_timeout(self.query_timeout, self.repository.find_by_email(email)).await
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        with_timeout(self.query_timeout, self.repository.update(user)).await
    }

    /// Resolve a token, reporting unknown or expired tokens as a field error.
    async fn resolve_token(
        &self,
        scope: TokenScope,
        token: &str,
        message: &str,
    ) -> Result<User, UserError> {
        match self.tokens.resolve(scope, token).await {
            Ok(user) => Ok(user),
            Err(TokenError::NotFound) => Err(ValidationErrors::single("token", message).into()),
            Err(e) => Err(e.into()),
        }
    }

    fn send(&self, recipient: &str, template: Template, data: serde_json::Value) {
        self.dispatcher.notify(
            Arc::clone(&self.mailer),
            Notification::new(recipient, template, data),
        );
    }
}

#[async_trait]
impl<UR, TS, M> UserServicePort for UserService<UR, TS, M>
where
    UR: UserRepository,
    TS: TokenServicePort,
    M: Mailer,
{
    async fn register_user(&self, command: RegisterUserCommand) -> Result<User, UserError> {
        let mut v = Validator::new();
        validate_registration(&mut v, &command);
        v.into_result()?;

        let RegisterUserCommand {
            name,
            email,
            password,
        } = command;

        let new_user = NewUser {
            name,
            email,
            password: Credential::set(&self.password_hasher, password)?,
            activated: false,
        };

        let user = match with_timeout(self.query_timeout, self.repository.create(new_user)).await {
            Ok(user) => user,
            Err(UserError::EmailAlreadyExists(_)) => {
                return Err(ValidationErrors::single(
                    "email",
                    "a user with this email address already exists",
                )
                .into());
            }
            Err(e) => return Err(e),
        };

        let token = self
            .tokens
            .issue(user.id, self.lifetimes.activation, TokenScope::Activation)
            .await?;

        self.send(
            &user.email,
            Template::UserWelcome,
            json!({
                "activationToken": token.plaintext,
                "userID": user.id.0,
            }),
        );

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    async fn request_activation_token(&self, email: &str) -> Result<(), UserError> {
        let mut v = Validator::new();
        validate_email(&mut v, email);
        v.into_result()?;

        let user = self.find_by_email(email).await?.ok_or_else(|| {
            UserError::Validation(ValidationErrors::single(
                "email",
                "no matching email address found",
            ))
        })?;

        if user.activated {
            return Err(
                ValidationErrors::single("email", "user has already been activated").into(),
            );
        }

        let token = self
            .tokens
            .issue(user.id, self.lifetimes.activation, TokenScope::Activation)
            .await?;

        self.send(
            &user.email,
            Template::TokenActivation,
            json!({ "activationToken": token.plaintext }),
        );

        tracing::info!(user_id = %user.id, "Activation token requested");
        Ok(())
    }

    async fn request_password_reset_token(&self, email: &str) -> Result<(), UserError> {
        let mut v = Validator::new();
        validate_email(&mut v, email);
        v.into_result()?;

        let user = self.find_by_email(email).await?.ok_or(UserError::NotFound)?;

        if !user.activated {
            return Err(
                ValidationErrors::single("email", "user account must be activated").into(),
            );
        }

        let token = self
            .tokens
            .issue(
                user.id,
                self.lifetimes.password_reset,
                TokenScope::PasswordReset,
            )
            .await?;

        self.send(
            &user.email,
            Template::TokenPasswordReset,
            json!({ "passwordResetToken": token.plaintext }),
        );

        tracing::info!(user_id = %user.id, "Password reset token requested");
        Ok(())
    }

    async fn activate_user(&self, token: &str) -> Result<User, UserError> {
        let mut v = Validator::new();
        validate_token_plaintext(&mut v, token);
        v.into_result()?;

        let mut user = self
            .resolve_token(
                TokenScope::Activation,
                token,
                "invalid or expired activation token",
            )
            .await?;

        user.activated = true;
        let user = self.update(user).await?;

        self.tokens
            .delete_all_for_user(TokenScope::Activation, user.id)
            .await?;

        tracing::info!(user_id = %user.id, "User activated");
        Ok(user)
    }

    async fn reset_password(&self, token: &str, password: String) -> Result<(), UserError> {
        let mut v = Validator::new();
        validate_password_plaintext(&mut v, &password);
        validate_token_plaintext(&mut v, token);
        v.into_result()?;

        let mut user = self
            .resolve_token(
                TokenScope::PasswordReset,
                token,
                "invalid or expired password reset token",
            )
            .await?;

        user.password = Credential::set(&self.password_hasher, password)?;
        let user = self.update(user).await?;

        self.tokens
            .delete_all_for_user(TokenScope::PasswordReset, user.id)
            .await?;

        tracing::info!(user_id = %user.id, "Password reset");
        Ok(())
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        with_timeout(self.query_timeout, self.repository.find_by_id(id))
            .await?
            .ok_or(UserError::NotFound)
    }
}
