//! HS256 token issuance and verification.
//!
//! `decode` only proves the token was signed with our secret and has the
//! expected claim shape. Expiry is judged by the gate, after the kind check.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::types::{Role, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
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

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: UserId,
    pub token_type: TokenKind,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub iat: i64,
    pub jti: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature or algorithm is invalid")]
    BadSignature,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // exp must be present, but its value is checked by the gate
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn issue(
        &self,
        sub: UserId,
        role: Role,
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        self.issue_at(sub, role, kind, ttl, Utc::now())
    }

    pub fn issue_at(
        &self,
        sub: UserId,
        role: Role,
        kind: TokenKind,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let iat = now.timestamp();
        let claims = Claims {
            sub,
            token_type: kind,
            exp: iat.saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)),
            role: Some(role.to_string()),
            iat,
            jti: Uuid::new_v4(),
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "failed to sign JWT");
            TokenError::Signing(e.to_string())
        })
    }

    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::BadSignature
                }
                _ => TokenError::Malformed,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-long-enough-for-hs256";

    fn codec() -> TokenCodec {
        TokenCodec::new(SECRET)
    }

    #[test]
    fn issued_token_decodes_to_the_same_claims() {
        let now = Utc::now();
        let token = codec()
            .issue_at(UserId(7), Role::Admin, TokenKind::Refresh, Duration::from_secs(60), now)
            .unwrap();

        let claims = codec().decode(&token).unwrap();
        assert_eq!(claims.sub, UserId(7));
        assert_eq!(claims.token_type, TokenKind::Refresh);
        assert_eq!(claims.role.as_deref(), Some("admin"));
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp, now.timestamp() + 60);
    }

    #[test]
    fn two_tokens_in_the_same_second_differ() {
        let now = Utc::now();
        let ttl = Duration::from_secs(60);
        let a = codec().issue_at(UserId(1), Role::User, TokenKind::Access, ttl, now).unwrap();
        let b = codec().issue_at(UserId(1), Role::User, TokenKind::Access, ttl, now).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn decode_does_not_judge_expiry() {
        let past = Utc::now() - chrono::Duration::hours(2);
        let token = codec()
            .issue_at(UserId(1), Role::User, TokenKind::Access, Duration::from_secs(1), past)
            .unwrap();
        assert!(codec().decode(&token).is_ok());
    }

    #[test]
    fn wrong_secret_is_a_bad_signature() {
        let token = TokenCodec::new("another-secret")
            .issue(UserId(1), Role::User, TokenKind::Access, Duration::from_secs(60))
            .unwrap();
        assert_eq!(codec().decode(&token), Err(TokenError::BadSignature));
    }

    #[test]
    fn other_algorithms_are_rejected() {
        let claims = Claims {
            sub: UserId(1),
            token_type: TokenKind::Access,
            exp: Utc::now().timestamp() + 60,
            role: None,
            iat: Utc::now().timestamp(),
            jti: Uuid::new_v4(),
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert_eq!(codec().decode(&token), Err(TokenError::BadSignature));
    }

    #[test]
    fn unsigned_and_garbage_tokens_are_malformed() {
        // {"alg":"none","typ":"JWT"} . {"sub":1} . (empty)
        let unsigned = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.eyJzdWIiOjF9.";
        assert!(codec().decode(unsigned).is_err());
        assert_eq!(codec().decode("not-a-jwt"), Err(TokenError::Malformed));
    }
}
