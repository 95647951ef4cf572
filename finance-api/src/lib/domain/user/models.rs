use std::fmt;
use std::str::FromStr;

use auth::TokenPair;
use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::user::errors::EmailError;
use crate::user::errors::PersonNameError;
use crate::user::errors::UserIdError;
use crate::user::errors::UserStatusError;
use crate::user::errors::UsernameError;

/// User aggregate entity.
///
/// Represents a registered identity. Never physically deleted; its
/// lifecycle is carried by `status`.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: EmailAddress,
    pub password_hash: String,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub created_by: String,
    pub updated_by: Option<String>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    ///
    /// # Returns
    /// UserId with random UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Ensures username is 3-50 characters and not only whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    const MIN_LENGTH: usize = 3;
    const MAX_LENGTH: usize = 50;

    /// Create a new valid username.
    ///
    /// # Arguments
    /// * `username` - Raw username string
    ///
    /// # Returns
    /// Validated Username value object
    ///
    /// # Errors
    /// * `TooShort` - Username shorter than 3 characters
    /// * `TooLong` - Username longer than 50 characters
    /// * `Blank` - Username is only whitespace
    pub fn new(username: String) -> Result<Self, UsernameError> {
        let username = Self::with_valid_length(username)?;
        let username = Self::with_content(username)?;
        Ok(Self(username))
    }

    fn with_valid_length(username: String) -> Result<String, UsernameError> {
        let length = username.chars().count();
        if length < Self::MIN_LENGTH {
            Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(username)
        }
    }

    fn with_content(username: String) -> Result<String, UsernameError> {
        if username.trim().is_empty() {
            Err(UsernameError::Blank)
        } else {
            Ok(username)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// First or last name of a user. Non-blank, at most 100 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    const MAX_LENGTH: usize = 100;

    pub fn new(name: String) -> Result<Self, PersonNameError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(PersonNameError::Blank);
        }
        let length = trimmed.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(PersonNameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle state of an identity.
///
/// Only `Active` identities may authenticate or refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserStatus {
    /// Registered, waiting for email verification
    Pending,
    Active,
    /// Deactivated; replaces physical deletion
    Inactive,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Pending => "PENDING",
            UserStatus::Active => "ACTIVE",
            UserStatus::Inactive => "INACTIVE",
        }
    }

    /// Whether moving from `self` to `target` is an allowed transition.
    ///
    /// `PENDING -> ACTIVE`, `ACTIVE -> INACTIVE` and `INACTIVE -> ACTIVE`.
    pub fn can_transition_to(&self, target: UserStatus) -> bool {
        matches!(
            (self, target),
            (UserStatus::Pending, UserStatus::Active)
                | (UserStatus::Active, UserStatus::Inactive)
                | (UserStatus::Inactive, UserStatus::Active)
        )
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = UserStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(UserStatus::Pending),
            "ACTIVE" => Ok(UserStatus::Active),
            "INACTIVE" => Ok(UserStatus::Inactive),
            other => Err(UserStatusError::Unknown(other.to_string())),
        }
    }
}

/// Command to register a new user with domain types
#[derive(Debug)]
pub struct RegisterCommand {
    pub username: Username,
    pub email: EmailAddress,
    pub password: String,
    pub first_name: PersonName,
    pub last_name: PersonName,
}

impl RegisterCommand {
    /// Construct a new register command.
    ///
    /// # Arguments
    /// * `username` - Validated username
    /// * `email` - Validated email address
    /// * `password` - Plain text password (complexity-checked and hashed by service)
    /// * `first_name` - Validated first name
    /// * `last_name` - Validated last name
    pub fn new(
        username: Username,
        email: EmailAddress,
        password: String,
        first_name: PersonName,
        last_name: PersonName,
    ) -> Self {
        Self {
            username,
            email,
            password,
            first_name,
            last_name,
        }
    }
}

/// Command to log in with either a username or an email address.
#[derive(Debug)]
pub struct LoginCommand {
    pub username_or_email: String,
    pub password: String,
}

/// Outcome of register, login and refresh.
///
/// `tokens` is `None` only for a registration that still awaits email
/// verification.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub tokens: Option<TokenPair>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_length_bounds() {
        assert!(matches!(
            Username::new("ab".to_string()),
            Err(UsernameError::TooShort { min: 3, actual: 2 })
        ));
        assert!(Username::new("abc".to_string()).is_ok());
        assert!(Username::new("a".repeat(50)).is_ok());
        assert!(matches!(
            Username::new("a".repeat(51)),
            Err(UsernameError::TooLong { max: 50, actual: 51 })
        ));
    }

    #[test]
    fn test_username_accepts_any_characters_within_length() {
        for name in ["john doe", "bob@home", "o'neil", "alice.smith_01-x"] {
            assert!(Username::new(name.to_string()).is_ok(), "{}", name);
        }
        assert_eq!(Username::new("    ".to_string()), Err(UsernameError::Blank));
    }

    #[test]
    fn test_email_validation() {
        assert!(EmailAddress::new("alice@x.com".to_string()).is_ok());
        assert!(EmailAddress::new("not-an-email".to_string()).is_err());
    }

    #[test]
    fn test_person_name_is_trimmed_and_bounded() {
        assert_eq!(PersonName::new("  Alice ".to_string()).unwrap().as_str(), "Alice");
        assert_eq!(PersonName::new("   ".to_string()), Err(PersonNameError::Blank));
        assert!(matches!(
            PersonName::new("x".repeat(101)),
            Err(PersonNameError::TooLong { .. })
        ));
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [UserStatus::Pending, UserStatus::Active, UserStatus::Inactive] {
            assert_eq!(status.as_str().parse::<UserStatus>(), Ok(status));
        }
        assert!("DELETED".parse::<UserStatus>().is_err());
    }

    #[test]
    fn test_status_transitions() {
        assert!(UserStatus::Pending.can_transition_to(UserStatus::Active));
        assert!(UserStatus::Active.can_transition_to(UserStatus::Inactive));
        assert!(UserStatus::Inactive.can_transition_to(UserStatus::Active));

        assert!(!UserStatus::Active.can_transition_to(UserStatus::Pending));
        assert!(!UserStatus::Inactive.can_transition_to(UserStatus::Pending));
        assert!(!UserStatus::Pending.can_transition_to(UserStatus::Inactive));
        assert!(!UserStatus::Active.can_transition_to(UserStatus::Active));
    }
}
