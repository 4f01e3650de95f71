use axum::extract::State;
use axum::http::StatusCode;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiJson;
use super::ApiSuccess;
use crate::domain::session::models::SessionToken;
use crate::inbound::http::router::AppState;

/// Exchange email and password for a signed session token.
pub async fn authenticate(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<AuthenticateRequestBody>,
) -> Result<ApiSuccess<AuthenticateResponseData>, ApiError> {
    state
        .session_service
        .authenticate(&body.email, &body.password)
        .await
        .map_err(ApiError::from)
        .map(|session| ApiSuccess::new(StatusCode::CREATED, session.into()))
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct AuthenticateRequestBody {
    email: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticateResponseData {
    pub authentication_token: TokenData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenData {
    pub token: String,
    pub expiry: DateTime<Utc>,
}

impl From<SessionToken> for AuthenticateResponseData {
    fn from(session: SessionToken) -> Self {
        Self {
            authentication_token: TokenData {
                token: session.token,
                expiry: session.expires_at,
            },
        }
    }
}
