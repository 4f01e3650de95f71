use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::Claims;

use crate::domain::clock::Clock;
use crate::domain::errors::with_timeout;
use crate::domain::session::errors::SessionError;
use crate::domain::session::models::SessionSettings;
use crate::domain::session::models::SessionToken;
use crate::domain::session::ports::SessionServicePort;
use crate::domain::user::models::UserId;
use crate::domain::user::validation::validate_email;
use crate::domain::user::validation::validate_password_plaintext;
use crate::domain::validation::Validator;
use crate::user::ports::UserRepository;

/// Verified against when the email is unknown.
const DECOY_PASSWORD: &str = "decoy-password-never-issued";

/// Domain service issuing and verifying signed session tokens.
///
/// Sessions are not persisted and cannot be revoked before they expire.
pub struct SessionService<UR>
where
    UR: UserRepository,
{
    users: Arc<UR>,
    authenticator: Arc<Authenticator>,
    clock: Arc<dyn Clock>,
    settings: SessionSettings,
    query_timeout: StdDuration,
    decoy_hash: OnceLock<Option<String>>,
}

impl<UR> SessionService<UR>
where
    UR: UserRepository,
{
    /// Create a new session service with injected dependencies.
    ///
    /// # Arguments
    /// * `users` - User lookup implementation
    /// * `authenticator` - Password verifier and token signer
    /// * `clock` - Time source for issued-at and expiry claims
    /// * `settings` - Issuer, audience and lifetime of issued tokens
    /// * `query_timeout` - Upper bound for each repository call
    pub fn new(
        users: Arc<UR>,
        authenticator: Arc<Authenticator>,
        clock: Arc<dyn Clock>,
        settings: SessionSettings,
        query_timeout: StdDuration,
    ) -> Self {
        Self {
            users,
            authenticator,
            clock,
            settings,
            query_timeout,
            decoy_hash: OnceLock::new(),
        }
    }
}

impl<UR> SessionService<UR>
where
    UR: UserRepository,
{
    fn verify_against_decoy(&self, password: &str) {
        let hasher = self.authenticator.password_hasher();
        let decoy = self
            .decoy_hash
            .get_or_init(|| hasher.hash(DECOY_PASSWORD).ok());

        if let Some(hash) = decoy {
            let _ = hasher.verify(password, hash);
        }
    }
}

#[async_trait]
impl<UR> SessionServicePort for SessionService<UR>
where
    UR: UserRepository,
{
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SessionToken, SessionError> {
        let mut v = Validator::new();
        validate_email(&mut v, email);
        validate_password_plaintext(&mut v, password);
        v.into_result()?;

        let found = with_timeout(self.query_timeout, self.users.find_by_email(email)).await?;
        let user = match found {
            Some(user) => user,
            None => {
                self.verify_against_decoy(password);
                tracing::debug!("Login attempt for unknown email");
                return Err(SessionError::InvalidCredentials);
            }
        };

        let now = self.clock.now();
        let claims = Claims::for_session(
            user.id,
            &self.settings.issuer,
            &self.settings.audience,
            now,
            self.settings.ttl,
        );

        let result = self
            .authenticator
            .authenticate(password, user.password.as_str(), &claims)
            .map_err(|e| match e {
                AuthenticationError::InvalidCredentials => {
                    tracing::debug!(user_id = %user.id, "Login attempt with wrong password");
                    SessionError::InvalidCredentials
                }
                AuthenticationError::PasswordError(err) => {
                    tracing::error!(
                        user_id = %user.id,
                        error = %err,
                        "Stored credential is unusable"
                    );
                    SessionError::Internal(format!("Password verification failed: {}", err))
                }
                AuthenticationError::JwtError(err) => {
                    SessionError::Internal(format!("Token generation failed: {}", err))
                }
            })?;

        tracing::info!(user_id = %user.id, "Session token issued");

        Ok(SessionToken {
            token: result.access_token,
            expires_at: now + self.settings.ttl,
        })
    }

    fn verify(&self, token: &str) -> Result<UserId, SessionError> {
        let claims: Claims = self.authenticator.validate_token(token).map_err(|e| {
            tracing::warn!(error = %e, "Session token rejected");
            SessionError::InvalidToken
        })?;

        let subject = claims.sub.as_deref().ok_or_else(|| {
            tracing::warn!("Session token without subject");
            SessionError::InvalidToken
        })?;

        UserId::from_string(subject).map_err(|e| {
            tracing::warn!(error = %e, "Session token with malformed subject");
            SessionError::InvalidToken
        })
    }
}

#[cfg(test)]
mod tests {
    use auth::JwtHandler;
    use auth::PasswordHasher;
    use chrono::Duration;
    use chrono::Utc;
    use mockall::mock;
    use mockall::predicate::*;

    use super::*;
    use crate::domain::clock::SystemClock;
    use crate::domain::errors::PersistenceError;
    use crate::domain::user::models::Credential;
    use crate::domain::user::models::NewUser;
    use crate::domain::user::models::User;
    use crate::user::errors::UserError;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: NewUser) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;
            async fn update(&self, user: User) -> Result<User, UserError>;
        }
    }

    fn hasher() -> PasswordHasher {
        PasswordHasher::with_params(8192, 1, 1).unwrap()
    }

    fn authenticator(secret: &[u8], issuer: &str) -> Arc<Authenticator> {
        let handler = JwtHandler::new(secret)
            .unwrap()
            .with_issuer(issuer)
            .with_audience("accounts");
        Arc::new(Authenticator::new(hasher(), handler))
    }

    fn service(repository: MockTestUserRepository) -> SessionService<MockTestUserRepository> {
        SessionService::new(
            Arc::new(repository),
            authenticator(SECRET, "accounts"),
            Arc::new(SystemClock),
            SessionSettings::default(),
            StdDuration::from_secs(3),
        )
    }

    fn alice(password_hash: String) -> User {
        User {
            id: UserId(7),
            created_at: Utc::now(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password: Credential::from_stored(password_hash).unwrap(),
            activated: true,
            version: 1,
        }
    }

    fn repository_with_alice() -> MockTestUserRepository {
        let hash = hasher().hash("pa55word").unwrap();
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_email()
            .with(eq("alice@example.com"))
            .returning(move |_| Ok(Some(alice(hash.clone()))));
        repository
            .expect_find_by_email()
            .returning(|_| Ok(None));
        repository
    }

    #[tokio::test]
    async fn test_authenticate_success_and_verify() {
        let service = service(repository_with_alice());

        let before = Utc::now();
        let session = service
            .authenticate("alice@example.com", "pa55word")
            .await
            .unwrap();

        assert!(session.expires_at >= before + Duration::hours(24));
        assert!(session.expires_at <= Utc::now() + Duration::hours(24));
        assert_eq!(service.verify(&session.token).unwrap(), UserId(7));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_are_indistinguishable() {
        let service = service(repository_with_alice());

        let wrong_password = service
            .authenticate("alice@example.com", "pa55wordx")
            .await
            .unwrap_err();
        let unknown_email = service
            .authenticate("nobody@example.com", "pa55word")
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, SessionError::InvalidCredentials));
        assert!(matches!(unknown_email, SessionError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_unknown_email_still_verifies_a_password() {
        let service = service(repository_with_alice());
        assert!(service.decoy_hash.get().is_none());

        let result = service.authenticate("nobody@example.com", "pa55word").await;

        assert!(matches!(result, Err(SessionError::InvalidCredentials)));
        assert!(matches!(service.decoy_hash.get(), Some(Some(_))));
    }

    #[tokio::test]
    async fn test_known_email_skips_decoy() {
        let service = service(repository_with_alice());

        let result = service.authenticate("alice@example.com", "pa55wordx").await;

        assert!(matches!(result, Err(SessionError::InvalidCredentials)));
        assert!(service.decoy_hash.get().is_none());
    }

    #[tokio::test]
    async fn test_authenticate_validates_input() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_find_by_email().times(0);

        let service = service(repository);

        match service.authenticate("not-an-email", "").await {
            Err(SessionError::Validation(errors)) => {
                assert_eq!(errors.get("email"), Some("must be a valid email address"));
                assert_eq!(errors.get("password"), Some("must be provided"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_authenticate_corrupted_hash_is_internal() {
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(Some(alice("not-a-phc-string".to_string()))));

        let service = service(repository);

        assert!(matches!(
            service.authenticate("alice@example.com", "pa55word").await,
            Err(SessionError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn test_authenticate_storage_failure() {
        let mut repository = MockTestUserRepository::new();
        repository.expect_find_by_email().times(1).returning(|_| {
            Err(UserError::Persistence(PersistenceError::Database(
                "connection reset".to_string(),
            )))
        });

        let service = service(repository);

        assert!(matches!(
            service.authenticate("alice@example.com", "pa55word").await,
            Err(SessionError::Persistence(_))
        ));
    }

    #[test]
    fn test_verify_rejects_foreign_tokens() {
        let service = service(MockTestUserRepository::new());

        let claims = Claims::for_session(
            7,
            "accounts",
            "accounts",
            Utc::now(),
            Duration::hours(1),
        );

        let wrong_key = JwtHandler::new(b"another_secret_key_of_32_bytes!!!")
            .unwrap()
            .encode(&claims)
            .unwrap();
        assert!(matches!(service.verify(&wrong_key), Err(SessionError::InvalidToken)));

        let wrong_issuer = Claims::for_session(
            7,
            "someone-else",
            "accounts",
            Utc::now(),
            Duration::hours(1),
        );
        let token = JwtHandler::new(SECRET).unwrap().encode(&wrong_issuer).unwrap();
        assert!(matches!(service.verify(&token), Err(SessionError::InvalidToken)));

        assert!(matches!(service.verify("garbage"), Err(SessionError::InvalidToken)));
    }

    #[test]
    fn test_verify_rejects_expired_and_non_numeric_subjects() {
        let service = service(MockTestUserRepository::new());
        let handler = JwtHandler::new(SECRET).unwrap();

        let expired = Claims::for_session(
            7,
            "accounts",
            "accounts",
            Utc::now() - Duration::hours(48),
            Duration::hours(24),
        );
        let token = handler.encode(&expired).unwrap();
        assert!(matches!(service.verify(&token), Err(SessionError::InvalidToken)));

        let named = Claims::for_session(
            "alice",
            "accounts",
            "accounts",
            Utc::now(),
            Duration::hours(1),
        );
        let token = handler.encode(&named).unwrap();
        assert!(matches!(service.verify(&token), Err(SessionError::InvalidToken)));
    }
}
