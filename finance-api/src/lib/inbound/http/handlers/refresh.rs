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
use crate::inbound::http::router::AppState;

pub async fn refresh(
    State(state): State<AppState>,
    body: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> Result<ApiSuccess<AuthResponseData>, ApiError> {
    let body = extract_json(body)?;

    if body.refresh_token.trim().is_empty() {
        let mut details = FieldErrors::new();
        details.insert(
            "refreshToken".to_string(),
            "Refresh token is required".to_string(),
        );
        return Err(ApiError::invalid_fields(details));
    }

    state
        .auth_service
        .refresh_token(body.refresh_token.trim())
        .await
        .map_err(ApiError::from)
        .map(|session| ApiSuccess::new(StatusCode::OK, session.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[serde(default)]
    refresh_token: String,
}
