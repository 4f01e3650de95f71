use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::ApiError;
use super::ApiJson;
use super::ApiSuccess;
use super::UserResponseData;
use crate::domain::user::models::RegisterUserCommand;
use crate::inbound::http::router::AppState;

/// Register an account. The activation token is emailed, not returned.
pub async fn register_user(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterUserRequest>,
) -> Result<ApiSuccess<UserResponseData>, ApiError> {
    state
        .user_service
        .register_user(body.into_command())
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::ACCEPTED, user.into()))
}

/// HTTP request body for registering a user (raw JSON)
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterUserRequest {
    name: String,
    email: String,
    password: String,
}

impl RegisterUserRequest {
    fn into_command(self) -> RegisterUserCommand {
        RegisterUserCommand::new(self.name, self.email, self.password)
    }
}
