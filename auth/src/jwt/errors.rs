use thiserror::Error;

/// Error type for identity token operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Signing secret too short: minimum {min} bytes, got {actual}")]
    WeakSecret { min: usize, actual: usize },

    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token signature is invalid")]
    InvalidToken,

    #[error("Token is expired")]
    ExpiredToken,

    #[error("Token is malformed: {0}")]
    MalformedToken(String),
}
