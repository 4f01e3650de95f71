use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::ApiError;
use super::ApiJson;
use super::ApiSuccess;
use super::MessageResponseData;
use crate::inbound::http::router::AppState;

pub async fn reset_password(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ResetPasswordRequest>,
) -> Result<ApiSuccess<MessageResponseData>, ApiError> {
    state
        .user_service
        .reset_password(&body.token, body.password)
        .await
        .map_err(ApiError::from)?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        MessageResponseData::new("your password was successfully reset"),
    ))
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ResetPasswordRequest {
    password: String,
    token: String,
}
