use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;

use crate::error::AppError;
use crate::repos::error::RepoError;
use crate::services::auth::credentials::{
    CredentialStore, NewUser, StoredSession, UserCredentials,
};
use crate::services::auth::gate::Principal;
use crate::services::auth::password::PasswordHasher;
use crate::services::auth::token_codec::{TokenCodec, TokenKind};
use crate::types::{Role, UserId};

/// Orchestrates registration, login, logout and access-token refresh.
///
/// Each user holds at most one live token per kind: issuing a new one
/// overwrites the stored digest, which revokes the previous token.
#[derive(Clone)]
pub struct SessionService {
    codec: TokenCodec,
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    access_ttl: Duration,
    refresh_ttl: Duration,
    // Verified against when the email is unknown, so both login failures cost one bcrypt run.
    decoy_hash: Arc<OnceCell<String>>,
}

/// Handlers map this into the HTTP DTO.
#[derive(Clone, Debug)]
pub struct IssuedTokens {
    pub user_id: UserId,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

impl SessionService {
    pub fn new(
        codec: TokenCodec,
        store: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            codec,
            store,
            hasher,
            access_ttl,
            refresh_ttl,
            decoy_hash: Arc::new(OnceCell::new()),
        }
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserCredentials, AppError> {
        let password_hash = self.hasher.hash(password).await?;
        let user = self
            .store
            .create_user(NewUser {
                name: name.trim().to_string(),
                email: normalize_email(email),
                password_hash,
            })
            .await
            .map_err(|e| match e {
                RepoError::Conflict => AppError::Conflict("email already registered".to_string()),
                other => other.into(),
            })?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedTokens, AppError> {
        let Some(user) = self.store.get_by_email(&normalize_email(email)).await? else {
            let decoy = self
                .decoy_hash
                .get_or_try_init(|| self.hasher.hash("decoy password"))
                .await?;
            self.hasher.verify(password, decoy).await?;
            return Err(AppError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &user.password_hash).await? {
            tracing::warn!(user_id = %user.id, "login with wrong password");
            return Err(AppError::InvalidCredentials);
        }

        let (access_token, access) = self.issue(user.id, user.role, TokenKind::Access)?;
        let (refresh_token, refresh) = self.issue(user.id, user.role, TokenKind::Refresh)?;
        self.store.store_sessions(user.id, access, refresh).await?;

        tracing::info!(user_id = %user.id, "user logged in");
        Ok(IssuedTokens {
            user_id: user.id,
            access_token,
            refresh_token,
            token_type: "Bearer",
            expires_in: self.access_ttl.as_secs(),
        })
    }

    /// Clears both stored tokens; the caller's access token stops working immediately.
    pub async fn logout(&self, principal: &Principal) -> Result<(), AppError> {
        self.store.clear_sessions(principal.id).await?;
        tracing::info!(user_id = %principal.id, "user logged out");
        Ok(())
    }

    /// `principal` was authenticated with its refresh token. Only the access
    /// record is replaced; the same refresh token is handed back.
    pub async fn refresh(&self, principal: &Principal) -> Result<IssuedTokens, AppError> {
        let (access_token, access) = self.issue(principal.id, principal.role, TokenKind::Access)?;
        self.store
            .store_session(principal.id, TokenKind::Access, access)
            .await?;

        Ok(IssuedTokens {
            user_id: principal.id,
            access_token,
            refresh_token: principal.token.clone(),
            token_type: "Bearer",
            expires_in: self.access_ttl.as_secs(),
        })
    }

    /// Signs a token of `kind` and builds the record that makes it the live one.
    fn issue(
        &self,
        user_id: UserId,
        role: Role,
        kind: TokenKind,
    ) -> Result<(String, StoredSession), AppError> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };

        let token = self
            .codec
            .issue(user_id, role, kind, ttl)
            .map_err(|_| AppError::Internal)?;

        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let session = StoredSession::for_token(&token, expires_at);
        Ok((token, session))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;
    use crate::services::auth::gate::{AuthFailure, AuthGate};
    use crate::testing::{MemoryCredentialStore, TEST_SECRET};

    struct Fixture {
        sessions: SessionService,
        gate: AuthGate,
        codec: TokenCodec,
        store: Arc<dyn CredentialStore>,
    }

    async fn fixture() -> Fixture {
        let store: Arc<dyn CredentialStore> = Arc::new(MemoryCredentialStore::default());
        let codec = TokenCodec::new(TEST_SECRET);
        let sessions = SessionService::new(
            codec.clone(),
            store.clone(),
            PasswordHasher::new(4 /* bcrypt minimum cost */),
            Duration::from_secs(3600),
            Duration::from_secs(7200),
        );
        sessions
            .register("Alice", "Alice@Example.com ", "correct horse")
            .await
            .unwrap();
        Fixture {
            sessions,
            gate: AuthGate::new(codec.clone(), store.clone()),
            codec,
            store,
        }
    }

    fn bearer(token: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
    }

    async fn check(gate: &AuthGate, token: &str, kind: TokenKind) -> Result<Principal, AuthFailure> {
        gate.authenticate(Some(&bearer(token)), kind).await
    }

    #[tokio::test]
    async fn login_issues_a_working_pair() {
        let f = fixture().await;
        let tokens = f.sessions.login("alice@example.com", "correct horse").await.unwrap();
        assert_eq!(tokens.token_type, "Bearer");
        assert_eq!(tokens.expires_in, 3600);

        let principal = check(&f.gate, &tokens.access_token, TokenKind::Access).await.unwrap();
        assert_eq!(principal.id, tokens.user_id);
        assert!(check(&f.gate, &tokens.refresh_token, TokenKind::Refresh).await.is_ok());
    }

    #[tokio::test]
    async fn stored_records_expire_with_their_tokens() {
        let f = fixture().await;
        let tokens = f.sessions.login("alice@example.com", "correct horse").await.unwrap();
        let user = f.store.get_by_id(tokens.user_id).await.unwrap().unwrap();

        for (token, kind) in [
            (&tokens.access_token, TokenKind::Access),
            (&tokens.refresh_token, TokenKind::Refresh),
        ] {
            let exp = f.codec.decode(token).unwrap().exp;
            let stored = user.session(kind).unwrap();
            assert!(stored.matches(token));
            assert!((stored.expires_at.timestamp() - exp).abs() <= 1, "{kind}");
        }
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let f = fixture().await;
        let wrong = f.sessions.login("alice@example.com", "nope").await.unwrap_err();
        let unknown = f.sessions.login("bob@example.com", "nope").await.unwrap_err();
        assert!(matches!(wrong, AppError::InvalidCredentials));
        assert!(matches!(unknown, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn unknown_email_still_runs_a_password_check() {
        let f = fixture().await;
        assert!(f.sessions.decoy_hash.get().is_none());

        let err = f.sessions.login("bob@example.com", "nope").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
        assert!(f.sessions.decoy_hash.get().is_some());
    }

    #[tokio::test]
    async fn concurrent_logins_leave_one_complete_pair() {
        let f = fixture().await;
        let (a, b) = tokio::join!(
            f.sessions.login("alice@example.com", "correct horse"),
            f.sessions.login("alice@example.com", "correct horse"),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        let mut live_pairs = 0;
        for tokens in [&a, &b] {
            let access = check(&f.gate, &tokens.access_token, TokenKind::Access).await.is_ok();
            let refresh = check(&f.gate, &tokens.refresh_token, TokenKind::Refresh).await.is_ok();
            assert_eq!(access, refresh, "access and refresh records come from different logins");
            if access {
                live_pairs += 1;
            }
        }
        assert_eq!(live_pairs, 1);
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let f = fixture().await;
        let err = f
            .sessions
            .register("Alice again", "alice@example.com", "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn second_login_revokes_the_first_pair() {
        let f = fixture().await;
        let first = f.sessions.login("alice@example.com", "correct horse").await.unwrap();
        let second = f.sessions.login("alice@example.com", "correct horse").await.unwrap();

        assert_eq!(
            check(&f.gate, &first.access_token, TokenKind::Access).await,
            Err(AuthFailure::Revoked)
        );
        assert_eq!(
            check(&f.gate, &first.refresh_token, TokenKind::Refresh).await,
            Err(AuthFailure::Revoked)
        );
        assert!(check(&f.gate, &second.access_token, TokenKind::Access).await.is_ok());
    }

    #[tokio::test]
    async fn logout_revokes_both_tokens() {
        let f = fixture().await;
        let tokens = f.sessions.login("alice@example.com", "correct horse").await.unwrap();
        let principal = check(&f.gate, &tokens.access_token, TokenKind::Access).await.unwrap();

        f.sessions.logout(&principal).await.unwrap();

        assert_eq!(
            check(&f.gate, &tokens.access_token, TokenKind::Access).await,
            Err(AuthFailure::Revoked)
        );
        assert_eq!(
            check(&f.gate, &tokens.refresh_token, TokenKind::Refresh).await,
            Err(AuthFailure::Revoked)
        );
    }

    #[tokio::test]
    async fn refresh_replaces_only_the_access_token() {
        let f = fixture().await;
        let tokens = f.sessions.login("alice@example.com", "correct horse").await.unwrap();
        let principal = check(&f.gate, &tokens.refresh_token, TokenKind::Refresh).await.unwrap();

        let refreshed = f.sessions.refresh(&principal).await.unwrap();

        assert_eq!(refreshed.refresh_token, tokens.refresh_token);
        assert_ne!(refreshed.access_token, tokens.access_token);
        assert_eq!(
            check(&f.gate, &tokens.access_token, TokenKind::Access).await,
            Err(AuthFailure::Revoked)
        );
        assert!(check(&f.gate, &refreshed.access_token, TokenKind::Access).await.is_ok());
        assert!(check(&f.gate, &tokens.refresh_token, TokenKind::Refresh).await.is_ok());
    }
}
