#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration as StdDuration;

use account_service::domain::clock::ManualClock;
use account_service::domain::clock::SystemClock;
use account_service::domain::errors::PersistenceError;
use account_service::domain::notification::dispatcher::NotificationDispatcher;
use account_service::domain::notification::errors::MailerError;
use account_service::domain::notification::ports::Mailer;
use account_service::domain::session::models::SessionSettings;
use account_service::domain::session::service::SessionService;
use account_service::domain::token::models::Token;
use account_service::domain::token::models::TokenScope;
use account_service::domain::token::ports::TokenRepository;
use account_service::domain::token::service::TokenService;
use account_service::domain::user::models::NewUser;
use account_service::domain::user::models::User;
use account_service::domain::user::models::UserId;
use account_service::domain::user::ports::UserRepository;
use account_service::domain::user::service::UserService;
use account_service::inbound::http::router::create_router;
use account_service::user::errors::UserError;
use async_trait::async_trait;
use auth::Authenticator;
use auth::JwtHandler;
use auth::PasswordHasher;
use auth::TokenDigest;
use chrono::DateTime;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::mpsc;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

pub fn password_hasher() -> PasswordHasher {
    PasswordHasher::with_params(8192, 1, 1).expect("valid test work factor")
}

#[derive(Debug, Clone)]
struct StoredToken {
    hash: TokenDigest,
    user_id: UserId,
    scope: TokenScope,
    expiry: DateTime<Utc>,
}

#[derive(Default)]
struct StoreState {
    next_id: i64,
    users: BTreeMap<i64, User>,
    tokens: Vec<StoredToken>,
}

/// Users and tokens kept in memory, with an optional delay on every call.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
    latency: Option<StdDuration>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: StdDuration) -> Self {
        Self {
            state: Mutex::default(),
            latency: Some(latency),
        }
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    /// Number of stored tokens of `scope` for `user_id`.
    pub fn token_count(&self, user_id: UserId, scope: TokenScope) -> usize {
        self.state
            .lock()
            .unwrap()
            .tokens
            .iter()
            .filter(|t| t.user_id == user_id && t.scope == scope)
            .count()
    }

    /// Every stored digest, as raw bytes.
    pub fn stored_digests(&self) -> Vec<[u8; 32]> {
        self.state
            .lock()
            .unwrap()
            .tokens
            .iter()
            .map(|t| *t.hash.as_bytes())
            .collect()
    }

    pub fn user(&self, id: UserId) -> Option<User> {
        self.state.lock().unwrap().users.get(&id.0).cloned()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        self.delay().await;
        let mut state = self.state.lock().unwrap();

        if state.users.values().any(|u| u.email == user.email) {
            return Err(UserError::EmailAlreadyExists(user.email));
        }

        state.next_id += 1;
        let created = User {
            id: UserId(state.next_id),
            created_at: Utc::now(),
            name: user.name,
            email: user.email,
            password: user.password,
            activated: user.activated,
            version: 1,
        };
        state.users.insert(created.id.0, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        self.delay().await;
        Ok(self.state.lock().unwrap().users.get(&id.0).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        self.delay().await;
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update(&self, mut user: User) -> Result<User, UserError> {
        self.delay().await;
        let mut state = self.state.lock().unwrap();

        match state.users.get(&user.id.0) {
            Some(current) if current.version == user.version => {}
            _ => return Err(UserError::EditConflict(user.id)),
        }

        user.version += 1;
        state.users.insert(user.id.0, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl TokenRepository for InMemoryStore {
    async fn insert(&self, token: &Token) -> Result<(), PersistenceError> {
        self.delay().await;
        self.state.lock().unwrap().tokens.push(StoredToken {
            hash: token.hash,
            user_id: token.user_id,
            scope: token.scope,
            expiry: token.expiry,
        });
        Ok(())
    }

    async fn find_user_by_token(
        &self,
        scope: TokenScope,
        hash: &TokenDigest,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, PersistenceError> {
        self.delay().await;
        let state = self.state.lock().unwrap();

        Ok(state
            .tokens
            .iter()
            .find(|t| t.hash == *hash && t.scope == scope && t.expiry > now)
            .and_then(|t| state.users.get(&t.user_id.0).cloned()))
    }

    async fn delete_all_for_user(
        &self,
        scope: TokenScope,
        user_id: UserId,
    ) -> Result<(), PersistenceError> {
        self.delay().await;
        self.state
            .lock()
            .unwrap()
            .tokens
            .retain(|t| !(t.user_id == user_id && t.scope == scope));
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub recipient: String,
    pub template: String,
    pub data: Value,
}

/// Mailer that hands every message to the test through a channel.
pub struct RecordingMailer {
    sent: mpsc::UnboundedSender<SentEmail>,
}

impl RecordingMailer {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SentEmail>) {
        let (sent, rx) = mpsc::unbounded_channel();
        (Self { sent }, rx)
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(
        &self,
        recipient: &str,
        template_id: &str,
        data: &Value,
    ) -> Result<(), MailerError> {
        self.sent
            .send(SentEmail {
                recipient: recipient.to_string(),
                template: template_id.to_string(),
                data: data.clone(),
            })
            .map_err(|e| MailerError::Transport(e.to_string()))
    }
}

/// Test application that spawns a real server over in-memory adapters
pub struct TestApp {
    pub address: String,
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<ManualClock>,
    pub api_client: reqwest::Client,
    mail: tokio::sync::Mutex<mpsc::UnboundedReceiver<SentEmail>>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        Self::spawn_with(InMemoryStore::new(), StdDuration::from_secs(3)).await
    }

    pub async fn spawn_with(store: InMemoryStore, query_timeout: StdDuration) -> Self {
        let store = Arc::new(store);
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let (mailer, mail) = RecordingMailer::new();

        let token_service = Arc::new(TokenService::new(
            Arc::clone(&store),
            clock.clone(),
            query_timeout,
        ));

        let user_service = Arc::new(
            UserService::new(
                Arc::clone(&store),
                token_service,
                Arc::new(mailer),
                NotificationDispatcher::new(4),
                password_hasher(),
            )
            .with_query_timeout(query_timeout),
        );

        let jwt_handler = JwtHandler::new(JWT_SECRET)
            .expect("test secret is long enough")
            .with_issuer("accounts")
            .with_audience("accounts");
        let session_service = Arc::new(SessionService::new(
            Arc::clone(&store),
            Arc::new(Authenticator::new(password_hasher(), jwt_handler)),
            Arc::new(SystemClock),
            SessionSettings::default(),
            query_timeout,
        ));

        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let router = create_router(user_service, session_service);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            store,
            clock,
            api_client: reqwest::Client::new(),
            mail: tokio::sync::Mutex::new(mail),
        }
    }

    /// Wait for the next email the service sends.
    pub async fn next_email(&self) -> SentEmail {
        let mut mail = self.mail.lock().await;
        tokio::time::timeout(StdDuration::from_secs(2), mail.recv())
            .await
            .expect("Timed out waiting for email")
            .expect("Mailer channel closed")
    }

    /// True when no email is waiting.
    pub async fn no_pending_email(&self) -> bool {
        self.mail.lock().await.try_recv().is_err()
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make PUT request
    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.put(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Register a user and return the activation token from the welcome email.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> String {
        let response = self
            .post("/v1/users")
            .json(&serde_json::json!({
                "name": name,
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::ACCEPTED);

        let email = self.next_email().await;
        assert_eq!(email.template, "user_welcome");
        email.data["activationToken"]
            .as_str()
            .expect("welcome email carries a token")
            .to_string()
    }

    /// Register and activate a user.
    pub async fn register_active(&self, name: &str, email: &str, password: &str) {
        let token = self.register(name, email, password).await;
        let response = self
            .put("/v1/users/activated")
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);
    }

    /// Post credentials to the login endpoint.
    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/v1/tokens/authentication")
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }
}
