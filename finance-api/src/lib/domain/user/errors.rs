use auth::TokenError;
use thiserror::Error;

use crate::domain::user::models::UserStatus;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username must be at least {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Username must be at most {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("Username is required")]
    Blank,
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Email must be valid: {0}")]
    InvalidFormat(String),
}

/// Error for first/last name validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersonNameError {
    #[error("Name is required")]
    Blank,

    #[error("Name must not exceed {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserStatusError {
    #[error("Unknown user status: {0}")]
    Unknown(String),
}

/// Failure signals raised by a `UserDirectory` implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("Username is already taken: {0}")]
    DuplicateUsername(String),

    #[error("Email is already registered: {0}")]
    DuplicateEmail(String),

    #[error("No user found with id {0}")]
    NotFound(String),

    #[error("Directory storage error: {0}")]
    Database(String),
}

/// Top-level error for authentication operations
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error(
        "Password must contain at least one uppercase letter, one lowercase letter, one digit, and one special character"
    )]
    WeakPassword,

    #[error("Username is already taken")]
    UsernameTaken,

    #[error("Email is already registered")]
    EmailTaken,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Account is not active")]
    AccountNotActive,

    #[error("User not found")]
    NotFound,

    #[error("Invalid refresh token")]
    InvalidTokenKind,

    #[error("Invalid or expired token: {0}")]
    InvalidToken(#[from] TokenError),

    #[error("Cannot change status from {from} to {to}")]
    InvalidStatusTransition { from: UserStatus, to: UserStatus },

    // Infrastructure errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<DirectoryError> for AuthError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::DuplicateUsername(_) => AuthError::UsernameTaken,
            DirectoryError::DuplicateEmail(_) => AuthError::EmailTaken,
            DirectoryError::NotFound(_) => AuthError::NotFound,
            DirectoryError::Database(msg) => AuthError::DatabaseError(msg),
        }
    }
}

impl From<auth::PasswordError> for AuthError {
    fn from(err: auth::PasswordError) -> Self {
        AuthError::Unknown(err.to_string())
    }
}
