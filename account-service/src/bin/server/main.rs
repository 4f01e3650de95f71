use std::sync::Arc;

use account_service::config::Config;
use account_service::domain::clock::Clock;
use account_service::domain::clock::SystemClock;
use account_service::domain::notification::dispatcher::NotificationDispatcher;
use account_service::domain::session::service::SessionService;
use account_service::domain::token::service::TokenService;
use account_service::domain::user::service::UserService;
use account_service::inbound::http::router::create_router;
use account_service::outbound::mailer::HttpMailer;
use account_service::outbound::repositories::PostgresTokenRepository;
use account_service::outbound::repositories::PostgresUserRepository;
use auth::Authenticator;
use auth::JwtHandler;
use auth::PasswordHasher;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "account-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        max_connections = config.database.max_connections,
        query_timeout_secs = config.database.query_timeout_secs,
        mailer_endpoint = %config.mailer.endpoint,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let query_timeout = config.query_timeout();

    let password_hasher = PasswordHasher::with_params(
        config.password.memory_kib,
        config.password.iterations,
        config.password.parallelism,
    )?;
    let jwt_handler = JwtHandler::new(config.jwt.secret.as_bytes())?
        .with_issuer(&config.jwt.issuer)
        .with_audience(&config.jwt.audience);
    let authenticator = Arc::new(Authenticator::new(password_hasher.clone(), jwt_handler));

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool.clone()));
    let token_repository = Arc::new(PostgresTokenRepository::new(pg_pool));
    let mailer = Arc::new(HttpMailer::new(&config.mailer)?);
    let dispatcher = NotificationDispatcher::new(config.notifications.max_in_flight)
        .with_max_queued(config.notifications.max_queued);

    let token_service = Arc::new(TokenService::new(
        token_repository,
        Arc::clone(&clock),
        query_timeout,
    ));

    let user_service = Arc::new(
        UserService::new(
            Arc::clone(&user_repository),
            token_service,
            mailer,
            dispatcher,
            password_hasher,
        )
        .with_token_lifetimes(config.token_lifetimes())
        .with_query_timeout(query_timeout),
    );

    let session_service = Arc::new(SessionService::new(
        user_repository,
        authenticator,
        clock,
        config.session_settings(),
        query_timeout,
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(user_service, session_service);
    axum::serve(http_listener, http_application).await?;

    tracing::info!("Server exited");
    Ok(())
}
