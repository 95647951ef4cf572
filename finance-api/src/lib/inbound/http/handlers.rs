use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::domain::user::models::AuthSession;
use crate::domain::user::models::User;
use crate::user::errors::AuthError;

pub mod health;
pub mod login;
pub mod me;
pub mod refresh;
pub mod register;

const DATABASE_ERROR_MESSAGE: &str = "A database error occurred. Please try again later.";
const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

/// Field name to message map carried by field-level validation failures.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<T>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(data))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    Validation {
        message: String,
        details: Option<FieldErrors>,
    },
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    /// Raw store error; logged, never sent to the client
    Database(String),
    /// Raw failure detail; logged, never sent to the client
    InternalServerError(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            details: None,
        }
    }

    pub fn invalid_fields(details: FieldErrors) -> Self {
        ApiError::Validation {
            message: format!("Validation failed for {} field(s)", details.len()),
            details: Some(details),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Database(_) | ApiError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "AUTHENTICATION_ERROR",
            ApiError::NotFound(_) => "RESOURCE_NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Database(_) | ApiError::InternalServerError(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (message, details) = match self {
            ApiError::Validation { message, details } => (message, details),
            ApiError::Unauthorized(msg) | ApiError::NotFound(msg) | ApiError::Conflict(msg) => {
                (msg, None)
            }
            ApiError::Database(detail) => {
                tracing::error!(error = %detail, "Database error while handling request");
                (DATABASE_ERROR_MESSAGE.to_string(), None)
            }
            ApiError::InternalServerError(detail) => {
                tracing::error!(error = %detail, "Unexpected error while handling request");
                (INTERNAL_ERROR_MESSAGE.to_string(), None)
            }
        };

        let body = ErrorResponse::new(status, message, code, details);

        // The envelope rides along so the path can be filled in on the way out
        let mut response = (status, Json(body.clone())).into_response();
        response.extensions_mut().insert(body);
        response
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::WeakPassword
            | AuthError::InvalidTokenKind
            | AuthError::InvalidStatusTransition { .. } => ApiError::validation(err.to_string()),
            AuthError::InvalidCredentials | AuthError::AccountNotActive => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::InvalidToken(_) => {
                ApiError::Unauthorized("Invalid or expired token".to_string())
            }
            AuthError::NotFound => ApiError::NotFound(err.to_string()),
            AuthError::UsernameTaken | AuthError::EmailTaken => ApiError::Conflict(err.to_string()),
            AuthError::DatabaseError(msg) => ApiError::Database(msg),
            AuthError::Unknown(msg) => ApiError::InternalServerError(msg),
        }
    }
}

/// Unwrap a JSON body, turning a rejection into a 400 validation failure.
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    result.map(|Json(value)| value).map_err(ApiError::from)
}

/// Uniform error envelope returned for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub error: String,
    pub message: String,
    pub code: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<FieldErrors>,
}

impl ErrorResponse {
    pub fn new(
        status: StatusCode,
        message: String,
        code: &str,
        details: Option<FieldErrors>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Unknown").to_string(),
            message,
            code: code.to_string(),
            path: String::new(),
            details,
        }
    }
}

/// Response body of register, login and refresh.
///
/// Token fields are absent for a registration still awaiting email
/// verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponseData {
    #[serde(flatten)]
    pub tokens: Option<TokenData>,
    pub user: UserInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenData {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub status: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.as_str().to_string(),
            email: user.email.as_str().to_string(),
            first_name: user.first_name.as_str().to_string(),
            last_name: user.last_name.as_str().to_string(),
            status: user.status.as_str().to_string(),
        }
    }
}

impl From<AuthSession> for AuthResponseData {
    fn from(session: AuthSession) -> Self {
        Self {
            user: (&session.user).into(),
            tokens: session.tokens.map(|pair| TokenData {
                access_token: pair.access_token,
                refresh_token: pair.refresh_token,
                token_type: auth::TOKEN_TYPE.to_string(),
                expires_in: pair.expires_in,
            }),
        }
    }
}
