use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::claims::TokenKind;
use super::errors::TokenError;

/// Token codec for issuing and parsing signed identity tokens.
///
/// Uses HS256 (HMAC with SHA-256). The secret is injected once at
/// construction and never changes for the lifetime of the codec.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    validation: Validation,
}

impl TokenCodec {
    /// HS256 needs a key at least as long as the hash output.
    pub const MIN_SECRET_LENGTH: usize = 32;

    /// Create a new token codec with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens
    ///
    /// # Returns
    /// TokenCodec configured with HS256 and zero expiry leeway
    ///
    /// # Errors
    /// * `WeakSecret` - Secret shorter than 256 bits
    pub fn new(secret: &[u8]) -> Result<Self, TokenError> {
        if secret.len() < Self::MIN_SECRET_LENGTH {
            return Err(TokenError::WeakSecret {
                min: Self::MIN_SECRET_LENGTH,
                actual: secret.len(),
            });
        }

        let algorithm = Algorithm::HS256;
        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm,
            validation,
        })
    }

    /// Issue a token for `subject` valid for `ttl` from now.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue(&self, subject: &str, kind: TokenKind, ttl: Duration) -> Result<String, TokenError> {
        self.encode(&Claims::new(subject, kind, ttl))
    }

    /// Issue a token that also carries the `username` claim.
    pub fn issue_with_username(
        &self,
        subject: &str,
        username: &str,
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        self.encode(&Claims::new(subject, kind, ttl).with_username(username))
    }

    /// Encode claims into a signed token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Verify signature and expiry, then decode the claims.
    ///
    /// # Errors
    /// * `InvalidToken` - Signature does not match the secret
    /// * `ExpiredToken` - Token is past its `exp`
    /// * `MalformedToken` - Token is structurally invalid or misses required claims
    pub fn parse(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::ExpiredToken,
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::InvalidToken
                }
                _ => TokenError::MalformedToken(e.to_string()),
            })
    }

    /// Check whether `token` parses and carries the given kind.
    pub fn is_kind(&self, token: &str, kind: TokenKind) -> bool {
        self.parse(token)
            .map(|claims| claims.is_kind(kind))
            .unwrap_or(false)
    }

    /// Check whether `token` parses, is unexpired and belongs to `subject`.
    pub fn is_valid_for(&self, token: &str, subject: &str) -> bool {
        match self.parse(token) {
            Ok(claims) => claims.sub == subject && !claims.is_expired(Utc::now().timestamp()),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";

    fn codec() -> TokenCodec {
        TokenCodec::new(SECRET).expect("Failed to create codec")
    }

    #[test]
    fn test_issue_and_parse() {
        let codec = codec();

        let token = codec
            .issue_with_username("user123", "alice", TokenKind::Access, Duration::minutes(15))
            .expect("Failed to issue token");
        assert!(!token.is_empty());

        let claims = codec.parse(&token).expect("Failed to parse token");
        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.username(), Some("alice".to_string()));
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_rejects_short_secret() {
        let result = TokenCodec::new(b"too_short");
        assert!(matches!(
            result,
            Err(TokenError::WeakSecret { min: 32, actual: 9 })
        ));
    }

    #[test]
    fn test_parse_garbage_is_malformed() {
        let codec = codec();

        assert!(matches!(
            codec.parse("invalid.token.here"),
            Err(TokenError::MalformedToken(_))
        ));
        assert!(matches!(
            codec.parse("not-a-jwt"),
            Err(TokenError::MalformedToken(_))
        ));
    }

    #[test]
    fn test_parse_with_wrong_secret_is_invalid() {
        let issuer = TokenCodec::new(b"secret1_at_least_32_bytes_long_key!").unwrap();
        let verifier = TokenCodec::new(b"secret2_at_least_32_bytes_long_key!").unwrap();

        let token = issuer
            .issue("user123", TokenKind::Access, Duration::minutes(15))
            .unwrap();

        assert_eq!(verifier.parse(&token), Err(TokenError::InvalidToken));
    }

    #[test]
    fn test_expired_token_with_valid_signature_is_expired() {
        let codec = codec();
        let now = Utc::now().timestamp();
        let claims = Claims::new("user123", TokenKind::Access, Duration::minutes(15))
            .with_issued_at(now - 120)
            .with_expiration(now - 60);

        let token = codec.encode(&claims).unwrap();

        assert_eq!(codec.parse(&token), Err(TokenError::ExpiredToken));
        assert!(!codec.is_valid_for(&token, "user123"));
        assert!(!codec.is_kind(&token, TokenKind::Access));
    }

    #[test]
    fn test_missing_required_claim_is_malformed() {
        let codec = codec();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &serde_json::json!({ "type": "access", "iat": 0 }),
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert!(matches!(
            codec.parse(&token),
            Err(TokenError::MalformedToken(_))
        ));
    }

    #[test]
    fn test_is_kind_discriminates_access_and_refresh() {
        let codec = codec();
        let access = codec
            .issue("user123", TokenKind::Access, Duration::minutes(15))
            .unwrap();
        let refresh = codec
            .issue("user123", TokenKind::Refresh, Duration::days(7))
            .unwrap();

        assert!(codec.is_kind(&access, TokenKind::Access));
        assert!(!codec.is_kind(&access, TokenKind::Refresh));
        assert!(codec.is_kind(&refresh, TokenKind::Refresh));
        assert!(!codec.is_kind(&refresh, TokenKind::Access));
    }

    #[test]
    fn test_is_valid_for_checks_subject() {
        let codec = codec();
        let token = codec
            .issue("user123", TokenKind::Access, Duration::minutes(15))
            .unwrap();

        assert!(codec.is_valid_for(&token, "user123"));
        assert!(!codec.is_valid_for(&token, "user456"));
    }
}
