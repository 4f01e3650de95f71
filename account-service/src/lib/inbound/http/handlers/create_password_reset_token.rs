use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::ApiError;
use super::ApiJson;
use super::ApiSuccess;
use super::MessageResponseData;
use crate::inbound::http::router::AppState;

pub async fn create_password_reset_token(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreatePasswordResetTokenRequest>,
) -> Result<ApiSuccess<MessageResponseData>, ApiError> {
    state
        .user_service
        .request_password_reset_token(&body.email)
        .await
        .map_err(ApiError::from)?;

    Ok(ApiSuccess::new(
        StatusCode::ACCEPTED,
        MessageResponseData::new(
            "an email will be sent to you containing password reset instructions",
        ),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatePasswordResetTokenRequest {
    email: String,
}
