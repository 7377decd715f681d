/*
 * Responsibility
 * - the credential store contract the gate and session service depend on
 * - stored session records: one sha256 digest per user per token kind
 *
 * Notes
 * - the raw token is never persisted; only its digest
 * - a token is live iff its digest equals the stored one for its kind
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::repos::error::RepoResult;
use crate::services::auth::token_codec::TokenKind;
use crate::types::{Role, UserId};

pub fn hash_token(token: &str) -> Vec<u8> {
    Sha256::digest(token.as_bytes()).to_vec()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    pub token_hash: Vec<u8>,
    pub expires_at: DateTime<Utc>,
}

impl StoredSession {
    pub fn for_token(token: &str, expires_at: DateTime<Utc>) -> Self {
        Self {
            token_hash: hash_token(token),
            expires_at,
        }
    }

    pub fn matches(&self, token: &str) -> bool {
        self.token_hash == hash_token(token)
    }
}

#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub access: Option<StoredSession>,
    pub refresh: Option<StoredSession>,
}

impl UserCredentials {
    pub fn session(&self, kind: TokenKind) -> Option<&StoredSession> {
        match kind {
            TokenKind::Access => self.access.as_ref(),
            TokenKind::Refresh => self.refresh.as_ref(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    async fn get_by_id(&self, id: UserId) -> RepoResult<Option<UserCredentials>>;

    async fn get_by_email(&self, email: &str) -> RepoResult<Option<UserCredentials>>;

    /// Duplicate email surfaces as `RepoError::Conflict`.
    async fn create_user(&self, user: NewUser) -> RepoResult<UserCredentials>;

    /// Replaces the stored record for `kind`; any earlier token of that kind stops working.
    async fn store_session(
        &self,
        id: UserId,
        kind: TokenKind,
        session: StoredSession,
    ) -> RepoResult<()>;

    /// Replaces both records in one write, so the pair always comes from the same login.
    async fn store_sessions(
        &self,
        id: UserId,
        access: StoredSession,
        refresh: StoredSession,
    ) -> RepoResult<()>;

    async fn clear_sessions(&self, id: UserId) -> RepoResult<()>;
}
