use chrono::Duration;

use crate::jwt::Claims;
use crate::jwt::TokenCodec;
use crate::jwt::TokenError;
use crate::jwt::TokenKind;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and token issuance.
///
/// Provides high-level authentication operations by coordinating
/// password hashing and the token codec.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_codec: TokenCodec,
    access_token_ttl: Duration,
    refresh_token_ttl: Duration,
}

/// Scheme clients must present access tokens with.
pub const TOKEN_TYPE: &str = "Bearer";

/// Access and refresh tokens issued together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    /// Short-lived token authorizing API calls
    pub access_token: String,
    /// Long-lived token used only to obtain a new pair
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Authentication operation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Token error: {0}")]
    TokenError(#[from] TokenError),
}

impl Authenticator {
    pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;
    pub const DEFAULT_REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

    /// Create a new authenticator with default token lifetimes.
    ///
    /// # Arguments
    /// * `secret` - Secret key for token signing
    ///
    /// # Returns
    /// Configured Authenticator instance
    ///
    /// # Errors
    /// * `WeakSecret` - Secret shorter than the HS256 minimum
    pub fn new(secret: &[u8]) -> Result<Self, TokenError> {
        Ok(Self {
            password_hasher: PasswordHasher::new(),
            token_codec: TokenCodec::new(secret)?,
            access_token_ttl: Duration::seconds(Self::DEFAULT_ACCESS_TOKEN_TTL_SECS),
            refresh_token_ttl: Duration::seconds(Self::DEFAULT_REFRESH_TOKEN_TTL_SECS),
        })
    }

    /// Override access and refresh token lifetimes.
    pub fn with_token_ttls(mut self, access_token_ttl: Duration, refresh_token_ttl: Duration) -> Self {
        self.access_token_ttl = access_token_ttl;
        self.refresh_token_ttl = refresh_token_ttl;
        self
    }

    pub fn token_codec(&self) -> &TokenCodec {
        &self.token_codec
    }

    /// Access token lifetime in seconds.
    pub fn access_token_expires_in(&self) -> i64 {
        self.access_token_ttl.num_seconds()
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify credentials and issue a fresh token pair.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `subject` - Token subject (user identifier)
    /// * `username` - Username embedded as a custom claim
    ///
    /// # Returns
    /// TokenPair with access and refresh tokens
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Password verification failed
    /// * `TokenError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        subject: &str,
        username: &str,
    ) -> Result<TokenPair, AuthenticationError> {
        let is_valid = self.password_hasher.verify(password, stored_hash)?;

        if !is_valid {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.issue_token_pair(subject, username)?)
    }

    /// Issue an access and refresh token pair without password verification.
    ///
    /// Used after registration and for refresh rotation, where identity has
    /// already been established by other means.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token generation failed
    pub fn issue_token_pair(&self, subject: &str, username: &str) -> Result<TokenPair, TokenError> {
        let access_token = self.token_codec.issue_with_username(
            subject,
            username,
            TokenKind::Access,
            self.access_token_ttl,
        )?;
        let refresh_token = self.token_codec.issue_with_username(
            subject,
            username,
            TokenKind::Refresh,
            self.refresh_token_ttl,
        )?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.access_token_expires_in(),
        })
    }

    /// Validate and decode a token.
    ///
    /// # Errors
    /// * `TokenError` - Token validation or decoding failed
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.token_codec.parse(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authenticator() -> Authenticator {
        Authenticator::new(b"test_secret_key_at_least_32_bytes!").expect("Failed to build")
    }

    #[test]
    fn test_authenticate_success() {
        let authenticator = authenticator();

        let hash = authenticator
            .hash_password("Passw0rd!")
            .expect("Failed to hash password");

        let pair = authenticator
            .authenticate("Passw0rd!", &hash, "user123", "alice")
            .expect("Authentication failed");

        assert_eq!(pair.expires_in, 900);

        let access = authenticator
            .validate_token(&pair.access_token)
            .expect("Token validation failed");
        assert_eq!(access.sub, "user123");
        assert_eq!(access.kind, TokenKind::Access);
        assert_eq!(access.username(), Some("alice".to_string()));

        let refresh = authenticator
            .validate_token(&pair.refresh_token)
            .expect("Token validation failed");
        assert_eq!(refresh.kind, TokenKind::Refresh);
        assert_eq!(refresh.exp - refresh.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_authenticate_invalid_password() {
        let authenticator = authenticator();

        let hash = authenticator
            .hash_password("Passw0rd!")
            .expect("Failed to hash password");

        let result = authenticator.authenticate("wrong_password", &hash, "user123", "alice");
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_consecutive_pairs_differ() {
        let authenticator = authenticator();

        let first = authenticator.issue_token_pair("user123", "alice").unwrap();
        let second = authenticator.issue_token_pair("user123", "alice").unwrap();

        assert_ne!(first.access_token, second.access_token);
        assert_ne!(first.refresh_token, second.refresh_token);
    }

    #[test]
    fn test_custom_ttls() {
        let authenticator = authenticator()
            .with_token_ttls(Duration::seconds(60), Duration::seconds(120));

        let pair = authenticator.issue_token_pair("user123", "alice").unwrap();
        assert_eq!(pair.expires_in, 60);

        let refresh = authenticator.validate_token(&pair.refresh_token).unwrap();
        assert_eq!(refresh.exp - refresh.iat, 120);
    }

    #[test]
    fn test_validate_invalid_token() {
        let authenticator = authenticator();

        let result = authenticator.validate_token("invalid.token.here");
        assert!(result.is_err());
    }
}
