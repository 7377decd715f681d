//! Request authentication: turns an `Authorization` header into a [`Principal`].
//!
//! Checks run in a fixed order and stop at the first failure:
//! header present, `Bearer <token>` shape, signature, token kind, expiry,
//! principal exists, token is the one currently stored for that kind.

use std::sync::Arc;

use axum::http::HeaderValue;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::error::AppError;
use crate::services::auth::credentials::CredentialStore;
use crate::services::auth::token_codec::{TokenCodec, TokenKind};
use crate::types::{Role, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFailure {
    #[error("missing authorization header")]
    MissingHeader,
    #[error("authorization header is not `Bearer <token>`")]
    MalformedHeader,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("wrong token kind")]
    WrongTokenKind,
    #[error("token expired")]
    Expired,
    #[error("principal not found")]
    PrincipalNotFound,
    #[error("token revoked")]
    Revoked,
}

/// The authenticated caller, placed in request extensions by the access middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: UserId,
    pub role: Role,
    /// The bearer token that authenticated this request.
    pub token: String,
}

impl Principal {
    pub fn require_role(&self, role: Role) -> Result<(), AppError> {
        if self.role == role {
            return Ok(());
        }
        tracing::warn!(user_id = %self.id, role = %self.role, required = %role, "role check failed");
        Err(AppError::Forbidden)
    }
}

pub struct AuthGate {
    codec: TokenCodec,
    store: Arc<dyn CredentialStore>,
}

impl AuthGate {
    pub fn new(codec: TokenCodec, store: Arc<dyn CredentialStore>) -> Self {
        Self { codec, store }
    }

    pub async fn authenticate(
        &self,
        header: Option<&HeaderValue>,
        required: TokenKind,
    ) -> Result<Principal, AuthFailure> {
        self.authenticate_at(header, required, Utc::now()).await
    }

    pub async fn authenticate_at(
        &self,
        header: Option<&HeaderValue>,
        required: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<Principal, AuthFailure> {
        let token = bearer_token(header).inspect_err(|reason| {
            tracing::warn!(%reason, "authentication failed");
        })?;

        let claims = self.codec.decode(token).map_err(|err| {
            tracing::warn!(reason = %AuthFailure::InvalidSignature, error = %err, "authentication failed");
            AuthFailure::InvalidSignature
        })?;

        let user_id = claims.sub;
        let reject = |reason: AuthFailure| {
            tracing::warn!(%reason, %user_id, kind = %required, "authentication failed");
            reason
        };

        if claims.token_type != required {
            return Err(reject(AuthFailure::WrongTokenKind));
        }
        if claims.exp <= now.timestamp() {
            return Err(reject(AuthFailure::Expired));
        }

        let user = match self.store.get_by_id(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return Err(reject(AuthFailure::PrincipalNotFound)),
            Err(err) => {
                tracing::error!(error = %err, %user_id, "credential lookup failed");
                return Err(reject(AuthFailure::PrincipalNotFound));
            }
        };

        match user.session(required) {
            Some(session) if session.matches(token) => {}
            _ => return Err(reject(AuthFailure::Revoked)),
        }

        Ok(Principal {
            id: user.id,
            role: user.role,
            token: token.to_string(),
        })
    }
}

fn bearer_token(header: Option<&HeaderValue>) -> Result<&str, AuthFailure> {
    let value = match header {
        Some(v) if !v.is_empty() => v,
        _ => return Err(AuthFailure::MissingHeader),
    };
    let value = value.to_str().map_err(|_| AuthFailure::MalformedHeader)?;

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AuthFailure::MalformedHeader),
    }
}
