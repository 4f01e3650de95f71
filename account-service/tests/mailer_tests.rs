use std::sync::Arc;

use account_service::config::MailerConfig;
use account_service::config::Secret;
use account_service::domain::notification::errors::MailerError;
use account_service::domain::notification::ports::Mailer;
use account_service::outbound::mailer::HttpMailer;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Json;
use axum::Router;
use serde_json::json;
use serde_json::Value;
use tokio::sync::Mutex;

type Captured = Arc<Mutex<Vec<(Option<String>, Value)>>>;

async fn relay(
    State((captured, status)): State<(Captured, StatusCode)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, &'static str) {
    let api_key = headers
        .get("api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    captured.lock().await.push((api_key, body));
    (status, "relay says no")
}

/// Start a fake mail relay answering every send with `status`.
async fn spawn_relay(status: StatusCode) -> (String, Captured) {
    let captured: Captured = Arc::default();

    let router = Router::new()
        .route("/send", post(relay))
        .with_state((Arc::clone(&captured), status));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let address = format!("http://127.0.0.1:{}/send", listener.local_addr().unwrap().port());

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Relay error");
    });

    (address, captured)
}

fn mailer(endpoint: String) -> HttpMailer {
    HttpMailer::new(&MailerConfig {
        endpoint,
        api_key: Secret::from("relay-key".to_string()),
        sender: "Accounts <no-reply@example.com>".to_string(),
    })
    .expect("Failed to build mailer")
}

#[tokio::test]
async fn test_send_posts_template_and_data() {
    let (endpoint, captured) = spawn_relay(StatusCode::ACCEPTED).await;

    mailer(endpoint)
        .send(
            "alice@example.com",
            "token_activation",
            &json!({ "activationToken": "Y3QMGX3PJ3WLRL2YRTQGQ6KRHU" }),
        )
        .await
        .unwrap();

    let captured = captured.lock().await;
    assert_eq!(captured.len(), 1);

    let (api_key, body) = &captured[0];
    assert_eq!(api_key.as_deref(), Some("relay-key"));
    assert_eq!(
        body,
        &json!({
            "sender": "Accounts <no-reply@example.com>",
            "to": "alice@example.com",
            "template": "token_activation",
            "data": { "activationToken": "Y3QMGX3PJ3WLRL2YRTQGQ6KRHU" }
        })
    );
}

#[tokio::test]
async fn test_send_reports_rejection() {
    let (endpoint, _captured) = spawn_relay(StatusCode::BAD_GATEWAY).await;

    let result = mailer(endpoint)
        .send("alice@example.com", "user_welcome", &json!({}))
        .await;

    assert_eq!(
        result,
        Err(MailerError::Rejected {
            status: 502,
            body: "relay says no".to_string(),
        })
    );
}

#[tokio::test]
async fn test_send_reports_unreachable_relay() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let result = mailer(format!("http://127.0.0.1:{}/send", port))
        .send("alice@example.com", "user_welcome", &json!({}))
        .await;

    assert!(matches!(result, Err(MailerError::Transport(_))));
}
