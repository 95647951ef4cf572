use async_trait::async_trait;

use crate::domain::user::models::AuthSession;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserStatus;
use crate::domain::user::models::Username;
use crate::user::errors::AuthError;
use crate::user::errors::DirectoryError;

/// Port for authentication domain service operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new identity and issue its first token pair.
    ///
    /// # Arguments
    /// * `command` - Validated command with username, email, password and names
    ///
    /// # Returns
    /// Session with the created user and, unless email verification is
    /// required, an access/refresh token pair
    ///
    /// # Errors
    /// * `WeakPassword` - Password fails the complexity rule
    /// * `UsernameTaken` - Username is already taken
    /// * `EmailTaken` - Email is already registered
    /// * `DatabaseError` - Directory operation failed
    async fn register(&self, command: RegisterCommand) -> Result<AuthSession, AuthError>;

    /// Authenticate with username or email plus password.
    ///
    /// # Errors
    /// * `NotFound` - No identity matches the username or email
    /// * `AccountNotActive` - Identity status is not ACTIVE
    /// * `InvalidCredentials` - Password does not match
    /// * `DatabaseError` - Directory operation failed
    async fn login(&self, command: LoginCommand) -> Result<AuthSession, AuthError>;

    /// Exchange a refresh token for a brand-new token pair.
    ///
    /// # Errors
    /// * `InvalidToken` - Token is mis-signed, expired or malformed
    /// * `InvalidTokenKind` - Token is not a refresh token
    /// * `NotFound` - Identity no longer exists
    /// * `AccountNotActive` - Identity status is not ACTIVE
    async fn refresh_token(&self, refresh_token: &str) -> Result<AuthSession, AuthError>;

    /// Retrieve the identity a token subject refers to.
    ///
    /// # Errors
    /// * `NotFound` - Identity vanished since the token was issued
    async fn get_current_user(&self, subject: &UserId) -> Result<User, AuthError>;

    /// Move an identity to a new status (administrative action).
    ///
    /// # Errors
    /// * `NotFound` - Identity does not exist
    /// * `InvalidStatusTransition` - Transition is not allowed
    async fn change_status(
        &self,
        id: &UserId,
        status: UserStatus,
        changed_by: &str,
    ) -> Result<User, AuthError>;

    /// List identities in a given status.
    async fn list_by_status(&self, status: UserStatus) -> Result<Vec<User>, AuthError>;
}

/// Lookup and persistence capability for user identities.
///
/// The backing store is the authority on username/email uniqueness; a
/// violation surfaces as `DuplicateUsername` or `DuplicateEmail`.
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `Database` - Storage operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DirectoryError>;

    /// Retrieve user by username.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `Database` - Storage operation failed
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, DirectoryError>;

    /// Retrieve user by email address.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `Database` - Storage operation failed
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError>;

    /// Persist a new user and write its audit entry.
    ///
    /// # Returns
    /// Identifier of the stored user
    ///
    /// # Errors
    /// * `DuplicateUsername` - Username is already taken
    /// * `DuplicateEmail` - Email is already registered
    /// * `Database` - Storage operation failed
    async fn create(&self, user: User) -> Result<UserId, DirectoryError>;

    /// Update email, names, status and audit fields of an existing user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DuplicateEmail` - New email is already registered
    /// * `Database` - Storage operation failed
    async fn update(&self, user: User) -> Result<(), DirectoryError>;

    /// Retrieve all users with the given status.
    ///
    /// # Errors
    /// * `Database` - Storage operation failed
    async fn list_by_status(&self, status: UserStatus) -> Result<Vec<User>, DirectoryError>;
}
