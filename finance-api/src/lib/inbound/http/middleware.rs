use auth::TokenKind;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;

use crate::domain::user::models::UserId;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ErrorResponse;
use crate::inbound::http::router::AppState;

/// Authority granted to every authenticated identity.
pub const ROLE_USER: &str = "ROLE_USER";

const BEARER_PREFIX: &str = "Bearer ";

/// Extension type to store the authenticated identity in request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub username: String,
    pub scopes: Vec<String>,
}

/// Middleware that binds an `AuthenticatedUser` for requests carrying a
/// valid access token.
///
/// Never rejects: requests without a usable token continue anonymously and
/// protected routes turn them away in [`require_authentication`].
pub async fn authenticate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let already_bound = req.extensions().get::<AuthenticatedUser>().is_some();

    if !already_bound {
        if let Some(token) = extract_bearer_token(&req).map(str::to_owned) {
            if let Some(user) = resolve_identity(&state, &token).await {
                tracing::debug!(user_id = %user.user_id, "Request authenticated");
                req.extensions_mut().insert(user);
            }
        }
    }

    next.run(req).await
}

/// Rejects requests that reached a protected route without a bound identity.
pub async fn require_authentication(req: Request, next: Next) -> Result<Response, ApiError> {
    if req.extensions().get::<AuthenticatedUser>().is_none() {
        return Err(ApiError::Unauthorized(
            "Full authentication is required to access this resource".to_string(),
        ));
    }

    Ok(next.run(req).await)
}

/// Fills the request path into error envelopes produced further down the stack.
///
/// Error responses axum builds itself (405 and the like) carry no envelope;
/// they get one here, keeping their headers.
pub async fn fill_error_path(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let method = req.method().clone();
    let response = next.run(req).await;

    let status = response.status();
    let body = match response.extensions().get::<ErrorResponse>().cloned() {
        Some(body) => body,
        None if status.is_client_error() || status.is_server_error() => {
            let message = if status == StatusCode::METHOD_NOT_ALLOWED {
                format!("Request method {} is not supported for {}", method, path)
            } else {
                status.canonical_reason().unwrap_or("Request failed").to_string()
            };
            ErrorResponse::new(status, message, code_for_status(status), None)
        }
        None => return response,
    };

    with_envelope(response, ErrorResponse { path, ..body })
}

fn with_envelope(response: Response, body: ErrorResponse) -> Response {
    let (parts, _) = response.into_parts();
    let mut rebuilt = (parts.status, Json(body.clone())).into_response();

    for (name, value) in parts.headers.iter() {
        if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH {
            rebuilt.headers_mut().append(name.clone(), value.clone());
        }
    }
    rebuilt.extensions_mut().insert(body);
    rebuilt
}

fn code_for_status(status: StatusCode) -> &'static str {
    match status {
        StatusCode::UNAUTHORIZED => "AUTHENTICATION_ERROR",
        StatusCode::NOT_FOUND => "RESOURCE_NOT_FOUND",
        StatusCode::CONFLICT => "CONFLICT",
        s if s.is_server_error() => "INTERNAL_ERROR",
        _ => "VALIDATION_ERROR",
    }
}

async fn resolve_identity(state: &AppState, token: &str) -> Option<AuthenticatedUser> {
    let claims = match state.authenticator.validate_token(token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "Bearer token rejected");
            return None;
        }
    };

    let user_id = match UserId::from_string(&claims.sub) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(error = %e, "Token subject is not a user id");
            return None;
        }
    };

    let user = match state.user_directory.find_by_id(&user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::warn!(user_id = %user_id, "Token subject no longer exists");
            return None;
        }
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "Identity lookup failed");
            return None;
        }
    };

    if !claims.is_kind(TokenKind::Access) {
        tracing::warn!(user_id = %user_id, kind = %claims.kind, "Non-access token presented as bearer");
        return None;
    }

    if !state
        .authenticator
        .token_codec()
        .is_valid_for(token, &user.id.to_string())
    {
        return None;
    }

    if !user.is_active() {
        tracing::warn!(user_id = %user_id, status = %user.status, "Bearer token for inactive account");
        return None;
    }

    Some(AuthenticatedUser {
        user_id: user.id,
        username: user.username.to_string(),
        scopes: vec![ROLE_USER.to_string()],
    })
}

fn extract_bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
