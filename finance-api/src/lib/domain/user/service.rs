use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::TokenError;
use auth::TokenKind;
use auth::TokenPair;
use chrono::Utc;

use crate::domain::user::models::AuthSession;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserStatus;
use crate::domain::user::models::Username;
use crate::user::errors::AuthError;
use crate::user::ports::AuthServicePort;
use crate::user::ports::UserDirectory;

/// Audit actor recorded on identities created through self-registration.
pub const REGISTRATION_ACTOR: &str = "REGISTRATION";

/// Domain service implementation for authentication operations.
///
/// Orchestrates the user directory, password verification and token
/// issuance. Holds no mutable state of its own.
pub struct AuthService<UD>
where
    UD: UserDirectory + ?Sized,
{
    directory: Arc<UD>,
    authenticator: Arc<Authenticator>,
    require_email_verification: bool,
}

impl<UD> AuthService<UD>
where
    UD: UserDirectory + ?Sized,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// New registrations are ACTIVE immediately; see
    /// [`AuthService::with_email_verification`].
    ///
    /// # Arguments
    /// * `directory` - User directory implementation
    /// * `authenticator` - Password and token coordinator
    pub fn new(directory: Arc<UD>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            directory,
            authenticator,
            require_email_verification: false,
        }
    }

    /// When `required`, new registrations start PENDING and receive no tokens.
    pub fn with_email_verification(mut self, required: bool) -> Self {
        self.require_email_verification = required;
        self
    }

    fn issue_tokens(&self, user: &User) -> Result<TokenPair, AuthError> {
        self.authenticator
            .issue_token_pair(&user.id.to_string(), user.username.as_str())
            .map_err(|e| AuthError::Unknown(format!("Token generation failed: {}", e)))
    }

    async fn find_by_username_or_email(&self, identifier: &str) -> Result<Option<User>, AuthError> {
        // Identifiers outside the username length bounds can only be emails
        if let Ok(username) = Username::new(identifier.to_string()) {
            if let Some(user) = self.directory.find_by_username(&username).await? {
                return Ok(Some(user));
            }
        }

        Ok(self.directory.find_by_email(identifier).await?)
    }
}

#[async_trait]
impl<UD> AuthServicePort for AuthService<UD>
where
    UD: UserDirectory + ?Sized,
{
    async fn register(&self, command: RegisterCommand) -> Result<AuthSession, AuthError> {
        tracing::info!(username = %command.username, "Registration attempt");

        if !auth::has_complexity(&command.password) {
            tracing::warn!(username = %command.username, "Registration failed: weak password");
            return Err(AuthError::WeakPassword);
        }

        if self
            .directory
            .find_by_username(&command.username)
            .await?
            .is_some()
        {
            tracing::warn!(username = %command.username, "Registration failed: username already taken");
            return Err(AuthError::UsernameTaken);
        }

        if self
            .directory
            .find_by_email(command.email.as_str())
            .await?
            .is_some()
        {
            tracing::warn!(email = %command.email, "Registration failed: email already registered");
            return Err(AuthError::EmailTaken);
        }

        let password_hash = self.authenticator.hash_password(&command.password)?;

        let status = if self.require_email_verification {
            UserStatus::Pending
        } else {
            UserStatus::Active
        };

        let mut user = User {
            id: UserId::new(),
            username: command.username,
            email: command.email,
            password_hash,
            first_name: command.first_name,
            last_name: command.last_name,
            status,
            created_at: Utc::now(),
            updated_at: None,
            created_by: REGISTRATION_ACTOR.to_string(),
            updated_by: None,
        };

        // The store may still reject a concurrent duplicate that passed the pre-checks
        user.id = self.directory.create(user.clone()).await?;

        tracing::info!(
            user_id = %user.id,
            username = %user.username,
            status = %user.status,
            "User registered"
        );

        let tokens = if user.is_active() {
            Some(self.issue_tokens(&user)?)
        } else {
            None
        };

        Ok(AuthSession { user, tokens })
    }

    async fn login(&self, command: LoginCommand) -> Result<AuthSession, AuthError> {
        tracing::info!(login = %command.username_or_email, "Login attempt");

        let user = self
            .find_by_username_or_email(&command.username_or_email)
            .await?
            .ok_or_else(|| {
                tracing::warn!(login = %command.username_or_email, "Login failed: user not found");
                AuthError::NotFound
            })?;

        if !user.is_active() {
            tracing::warn!(
                username = %user.username,
                status = %user.status,
                "Login failed: account not active"
            );
            return Err(AuthError::AccountNotActive);
        }

        let tokens = self
            .authenticator
            .authenticate(
                &command.password,
                &user.password_hash,
                &user.id.to_string(),
                user.username.as_str(),
            )
            .map_err(|e| match e {
                AuthenticationError::InvalidCredentials => {
                    tracing::warn!(username = %user.username, "Login failed: invalid credentials");
                    AuthError::InvalidCredentials
                }
                AuthenticationError::PasswordError(err) => {
                    AuthError::Unknown(format!("Password verification failed: {}", err))
                }
                AuthenticationError::TokenError(err) => {
                    AuthError::Unknown(format!("Token generation failed: {}", err))
                }
            })?;

        tracing::info!(user_id = %user.id, username = %user.username, "Login successful");

        Ok(AuthSession {
            user,
            tokens: Some(tokens),
        })
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        let claims = self.authenticator.validate_token(refresh_token).map_err(|e| {
            tracing::warn!(error = %e, "Token refresh failed: token rejected");
            AuthError::InvalidToken(e)
        })?;

        if !claims.is_kind(TokenKind::Refresh) {
            tracing::warn!(kind = %claims.kind, "Token refresh failed: not a refresh token");
            return Err(AuthError::InvalidTokenKind);
        }

        let subject = UserId::from_string(&claims.sub)
            .map_err(|e| AuthError::InvalidToken(TokenError::MalformedToken(e.to_string())))?;

        let user = self.directory.find_by_id(&subject).await?.ok_or_else(|| {
            tracing::warn!(user_id = %subject, "Token refresh failed: user not found");
            AuthError::NotFound
        })?;

        if !user.is_active() {
            tracing::warn!(user_id = %subject, status = %user.status, "Token refresh failed: account not active");
            return Err(AuthError::AccountNotActive);
        }

        if !self
            .authenticator
            .token_codec()
            .is_valid_for(refresh_token, &claims.sub)
        {
            tracing::warn!(user_id = %subject, "Token refresh failed: token no longer valid");
            return Err(AuthError::InvalidToken(TokenError::ExpiredToken));
        }

        let tokens = self.issue_tokens(&user)?;
        tracing::info!(user_id = %user.id, "Tokens refreshed");

        Ok(AuthSession {
            user,
            tokens: Some(tokens),
        })
    }

    async fn get_current_user(&self, subject: &UserId) -> Result<User, AuthError> {
        self.directory.find_by_id(subject).await?.ok_or_else(|| {
            tracing::error!(user_id = %subject, "Current user lookup failed: not found");
            AuthError::NotFound
        })
    }

    async fn change_status(
        &self,
        id: &UserId,
        status: UserStatus,
        changed_by: &str,
    ) -> Result<User, AuthError> {
        let mut user = self
            .directory
            .find_by_id(id)
            .await?
            .ok_or(AuthError::NotFound)?;

        if !user.status.can_transition_to(status) {
            return Err(AuthError::InvalidStatusTransition {
                from: user.status,
                to: status,
            });
        }

        let previous = user.status;
        user.status = status;
        user.updated_at = Some(Utc::now());
        user.updated_by = Some(changed_by.to_string());

        self.directory.update(user.clone()).await?;

        tracing::info!(
            user_id = %user.id,
            from = %previous,
            to = %status,
            changed_by,
            "User status changed"
        );

        Ok(user)
    }

    async fn list_by_status(&self, status: UserStatus) -> Result<Vec<User>, AuthError> {
        Ok(self.directory.list_by_status(status).await?)
    }
}
