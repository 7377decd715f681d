/*
 * Responsibility
 * - users table: profile CRUD plus the credential store used by auth
 * - session digests live on the user row (one column pair per token kind)
 *
 * Schema
 *   users(id BIGSERIAL PK, name TEXT, email TEXT, password_hash TEXT,
 *         role TEXT DEFAULT 'user',
 *         access_token_hash BYTEA NULL, access_expires_at TIMESTAMPTZ NULL,
 *         refresh_token_hash BYTEA NULL, refresh_expires_at TIMESTAMPTZ NULL,
 *         created_at, updated_at TIMESTAMPTZ, deleted_at TIMESTAMPTZ NULL)
 *   UNIQUE INDEX ON users(email) WHERE deleted_at IS NULL
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repos::error::{RepoError, RepoResult};
use crate::repos::resource::Page;
use crate::services::auth::credentials::{
    CredentialStore, NewUser, StoredSession, UserCredentials,
};
use crate::services::auth::token_codec::TokenKind;
use crate::services::ownership::Owned;
use crate::types::{Role, UserId};

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user owns their own record.
impl Owned for UserRow {
    fn owner_id(&self) -> UserId {
        self.id
    }
}

#[derive(FromRow)]
struct CredentialRow {
    id: UserId,
    name: String,
    email: String,
    password_hash: String,
    #[sqlx(try_from = "String")]
    role: Role,
    access_token_hash: Option<Vec<u8>>,
    access_expires_at: Option<DateTime<Utc>>,
    refresh_token_hash: Option<Vec<u8>>,
    refresh_expires_at: Option<DateTime<Utc>>,
}

fn session(hash: Option<Vec<u8>>, expires_at: Option<DateTime<Utc>>) -> Option<StoredSession> {
    Some(StoredSession {
        token_hash: hash?,
        expires_at: expires_at?,
    })
}

impl From<CredentialRow> for UserCredentials {
    fn from(row: CredentialRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role: row.role,
            access: session(row.access_token_hash, row.access_expires_at),
            refresh: session(row.refresh_token_hash, row.refresh_expires_at),
        }
    }
}

const CREDENTIAL_COLUMNS: &str = "id, name, email, password_hash, role, \
     access_token_hash, access_expires_at, refresh_token_hash, refresh_expires_at";

#[derive(Clone)]
pub struct UserRepo {
    db: PgPool,
}

impl UserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list(&self, page: Page) -> RepoResult<Vec<UserRow>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, role, created_at, updated_at
            FROM users
            WHERE deleted_at IS NULL
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    pub async fn get(&self, id: UserId) -> RepoResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, role, created_at, updated_at
            FROM users
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    pub async fn update(
        &self,
        id: UserId,
        name: Option<&str>,
        password_hash: Option<&str>,
    ) -> RepoResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET
                name = COALESCE($2, name),
                password_hash = COALESCE($3, password_hash),
                updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, name, email, role, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(password_hash)
        .fetch_optional(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    /// Soft delete; also drops both stored tokens.
    pub async fn delete(&self, id: UserId) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET
                deleted_at = now(),
                access_token_hash = NULL,
                access_expires_at = NULL,
                refresh_token_hash = NULL,
                refresh_expires_at = NULL
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CredentialStore for UserRepo {
    async fn get_by_id(&self, id: UserId) -> RepoResult<Option<UserCredentials>> {
        let sql = format!(
            "SELECT {CREDENTIAL_COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL"
        );
        let row = sqlx::query_as::<_, CredentialRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn get_by_email(&self, email: &str) -> RepoResult<Option<UserCredentials>> {
        let sql = format!(
            "SELECT {CREDENTIAL_COLUMNS} FROM users WHERE email = $1 AND deleted_at IS NULL"
        );
        let row = sqlx::query_as::<_, CredentialRow>(&sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn create_user(&self, user: NewUser) -> RepoResult<UserCredentials> {
        let sql = format!(
            "INSERT INTO users (name, email, password_hash, role) \
             VALUES ($1, $2, $3, $4) RETURNING {CREDENTIAL_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CredentialRow>(&sql)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(Role::User.as_str())
            .fetch_one(&self.db)
            .await
            .map_err(RepoError::from_sqlx)?;

        Ok(row.into())
    }

    async fn store_session(
        &self,
        id: UserId,
        kind: TokenKind,
        session: StoredSession,
    ) -> RepoResult<()> {
        let sql = match kind {
            TokenKind::Access => {
                "UPDATE users SET access_token_hash = $2, access_expires_at = $3 WHERE id = $1"
            }
            TokenKind::Refresh => {
                "UPDATE users SET refresh_token_hash = $2, refresh_expires_at = $3 WHERE id = $1"
            }
        };

        sqlx::query(sql)
            .bind(id)
            .bind(&session.token_hash)
            .bind(session.expires_at)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    async fn store_sessions(
        &self,
        id: UserId,
        access: StoredSession,
        refresh: StoredSession,
    ) -> RepoResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET
                access_token_hash = $2,
                access_expires_at = $3,
                refresh_token_hash = $4,
                refresh_expires_at = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&access.token_hash)
        .bind(access.expires_at)
        .bind(&refresh.token_hash)
        .bind(refresh.expires_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn clear_sessions(&self, id: UserId) -> RepoResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET
                access_token_hash = NULL,
                access_expires_at = NULL,
                refresh_token_hash = NULL,
                refresh_expires_at = NULL
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}
