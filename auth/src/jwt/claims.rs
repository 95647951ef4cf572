use std::collections::HashMap;
use std::fmt;

use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Discriminates the purpose of an identity token.
///
/// Serialized into the `type` claim so an access token can never be
/// presented where a refresh token is expected, and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity token claims.
///
/// Standard RFC 7519 fields used by the service plus custom fields via `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,

    /// Token purpose
    #[serde(rename = "type")]
    pub kind: TokenKind,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique token identifier)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Additional custom fields (flattened into token)
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// Create claims issued now and expiring after `ttl`.
    ///
    /// # Arguments
    /// * `subject` - Unique user identifier
    /// * `kind` - Access or refresh
    /// * `ttl` - Lifetime of the token
    ///
    /// # Returns
    /// Claims with sub, type, iat, exp and a random jti set
    pub fn new(subject: impl ToString, kind: TokenKind, ttl: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + ttl;

        Self {
            sub: subject.to_string(),
            kind,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            jti: Some(Uuid::new_v4().to_string()),
            extra: HashMap::new(),
        }
    }

    /// Set issued at (Unix timestamp).
    pub fn with_issued_at(mut self, iat: i64) -> Self {
        self.iat = iat;
        self
    }

    /// Set expiration (Unix timestamp).
    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = exp;
        self
    }

    /// Add a custom field.
    pub fn with_extra(mut self, key: impl ToString, value: impl Serialize) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.extra.insert(key.to_string(), json_value);
        }
        self
    }

    /// Set the `username` custom field.
    pub fn with_username(self, username: &str) -> Self {
        self.with_extra("username", username)
    }

    /// Get username from extra fields (convenience method).
    pub fn username(&self) -> Option<String> {
        self.extra
            .get("username")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }

    pub fn is_kind(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Check if token is expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }
}
