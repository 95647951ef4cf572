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
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::PersonName;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::Username;
use crate::inbound::http::router::AppState;

const PASSWORD_MIN_LENGTH: usize = 8;
const PASSWORD_MAX_LENGTH: usize = 100;

pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<ApiSuccess<AuthResponseData>, ApiError> {
    let command = extract_json(body)?.try_into_command()?;

    state
        .auth_service
        .register(command)
        .await
        .map_err(ApiError::from)
        .map(|session| ApiSuccess::new(StatusCode::CREATED, session.into()))
}

/// HTTP request body for registering a user (raw JSON).
///
/// Missing fields deserialize as empty so they surface as field errors.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
}

impl RegisterRequest {
    fn try_into_command(self) -> Result<RegisterCommand, ApiError> {
        let RegisterRequest {
            username,
            email,
            password,
            first_name,
            last_name,
        } = self;

        let mut details = FieldErrors::new();

        let username = Username::new(username)
            .map_err(|e| details.insert("username".to_string(), e.to_string()))
            .ok();
        let email = EmailAddress::new(email)
            .map_err(|e| details.insert("email".to_string(), e.to_string()))
            .ok();
        let first_name = PersonName::new(first_name)
            .map_err(|e| details.insert("firstName".to_string(), e.to_string()))
            .ok();
        let last_name = PersonName::new(last_name)
            .map_err(|e| details.insert("lastName".to_string(), e.to_string()))
            .ok();

        let password_length = password.chars().count();
        if !(PASSWORD_MIN_LENGTH..=PASSWORD_MAX_LENGTH).contains(&password_length) {
            details.insert(
                "password".to_string(),
                format!(
                    "Password must be between {} and {} characters",
                    PASSWORD_MIN_LENGTH, PASSWORD_MAX_LENGTH
                ),
            );
        }

        match (username, email, first_name, last_name) {
            (Some(username), Some(email), Some(first_name), Some(last_name))
                if details.is_empty() =>
            {
                Ok(RegisterCommand::new(
                    username, email, password, first_name, last_name,
                ))
            }
            _ => Err(ApiError::invalid_fields(details)),
        }
    }
}
