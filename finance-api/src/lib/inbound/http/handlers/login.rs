use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::extract_json;
use super::ApiError;
use super::ApiSuccess;
use super::AuthResponseData;
use super::FieldErrors;
use crate::domain::user::models::LoginCommand;
use crate::inbound::http::router::AppState;
use crate::user::errors::AuthError;

const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password";

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiSuccess<AuthResponseData>, ApiError> {
    let command = extract_json(body)?.try_into_command()?;

    state
        .auth_service
        .login(command)
        .await
        .map_err(|e| match e {
            // Unknown users look exactly like a wrong password
            AuthError::NotFound | AuthError::InvalidCredentials => {
                ApiError::Unauthorized(INVALID_CREDENTIALS_MESSAGE.to_string())
            }
            _ => ApiError::from(e),
        })
        .map(|session| ApiSuccess::new(StatusCode::OK, session.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    username_or_email: String,
    #[serde(default)]
    password: String,
}

impl LoginRequest {
    fn try_into_command(self) -> Result<LoginCommand, ApiError> {
        let mut details = FieldErrors::new();

        if self.username_or_email.trim().is_empty() {
            details.insert(
                "usernameOrEmail".to_string(),
                "Username or email is required".to_string(),
            );
        }
        if self.password.trim().is_empty() {
            details.insert("password".to_string(), "Password is required".to_string());
        }

        if !details.is_empty() {
            return Err(ApiError::invalid_fields(details));
        }

        Ok(LoginCommand {
            username_or_email: self.username_or_email.trim().to_string(),
            password: self.password,
        })
    }
}
