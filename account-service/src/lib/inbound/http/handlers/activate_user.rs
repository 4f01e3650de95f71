use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::ApiError;
use super::ApiJson;
use super::ApiSuccess;
use super::UserResponseData;
use crate::inbound::http::router::AppState;

pub async fn activate_user(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ActivateUserRequest>,
) -> Result<ApiSuccess<UserResponseData>, ApiError> {
    state
        .user_service
        .activate_user(&body.token)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ActivateUserRequest {
    token: String,
}
