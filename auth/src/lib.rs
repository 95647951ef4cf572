//! Authentication utilities library
//!
//! Provides the reusable authentication primitives of the service:
//! - Password hashing (Argon2id) and the password complexity rule
//! - Signed identity tokens (access/refresh) with issuance and validation
//! - Authentication coordination
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("Passw0rd!").unwrap();
//! let is_valid = hasher.verify("Passw0rd!", &hash).unwrap();
//! assert!(is_valid);
//! assert!(auth::has_complexity("Passw0rd!"));
//! ```
//!
//! ## Identity Tokens
//! ```
//! use auth::{TokenCodec, TokenKind};
//! use chrono::Duration;
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!").unwrap();
//! let token = codec.issue("user123", TokenKind::Access, Duration::minutes(15)).unwrap();
//! let claims = codec.parse(&token).unwrap();
//! assert_eq!(claims.sub, "user123");
//! assert!(!codec.is_kind(&token, TokenKind::Refresh));
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::Authenticator;
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!").unwrap();
//!
//! // Register: hash password
//! let hash = auth.hash_password("Passw0rd!").unwrap();
//!
//! // Login: verify and issue tokens
//! let pair = auth.authenticate("Passw0rd!", &hash, "user123", "alice").unwrap();
//!
//! // Validate token
//! let claims = auth.validate_token(&pair.access_token).unwrap();
//! assert_eq!(claims.username(), Some("alice".to_string()));
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use authenticator::TokenPair;
pub use authenticator::TOKEN_TYPE;
pub use jwt::Claims;
pub use jwt::TokenCodec;
pub use jwt::TokenError;
pub use jwt::TokenKind;
pub use password::has_complexity;
pub use password::PasswordError;
pub use password::PasswordHasher;
