//! In-memory fakes shared by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;

use crate::api::v1::dto::posts::{CreatePostRequest, UpdatePostRequest};
use crate::repos::error::{RepoError, RepoResult};
use crate::repos::post_repo::PostRow;
use crate::repos::resource::{Page, ResourceRepo};
use crate::services::auth::credentials::{
    CredentialStore, NewUser, StoredSession, UserCredentials,
};
use crate::services::auth::gate::Principal;
use crate::services::auth::token_codec::TokenKind;
use crate::types::{Role, UserId};

pub const TEST_SECRET: &str = "unit-test-secret-of-reasonable-length!!";

pub fn principal(id: i64) -> Principal {
    Principal {
        id: UserId(id),
        role: Role::User,
        token: String::new(),
    }
}

#[derive(Default)]
pub struct MemoryCredentialStore {
    users: Mutex<HashMap<UserId, UserCredentials>>,
    next_id: AtomicI64,
    failing: AtomicBool,
}

impl MemoryCredentialStore {
    pub async fn insert_user(&self, email: &str, role: Role) -> UserId {
        let id = UserId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.users.lock().insert(
            id,
            UserCredentials {
                id,
                name: email.to_string(),
                email: email.to_string(),
                password_hash: String::new(),
                role,
                access: None,
                refresh: None,
            },
        );
        id
    }

    /// Makes every lookup fail as if the database were unreachable.
    pub fn fail_lookups(&self, on: bool) {
        self.failing.store(on, Ordering::SeqCst);
    }

    fn check_available(&self) -> RepoResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepoError::Db(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get_by_id(&self, id: UserId) -> RepoResult<Option<UserCredentials>> {
        self.check_available()?;
        Ok(self.users.lock().get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> RepoResult<Option<UserCredentials>> {
        self.check_available()?;
        Ok(self
            .users
            .lock()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> RepoResult<UserCredentials> {
        let mut users = self.users.lock();
        if users.values().any(|u| u.email == user.email) {
            return Err(RepoError::Conflict);
        }
        let id = UserId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let created = UserCredentials {
            id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: Role::User,
            access: None,
            refresh: None,
        };
        users.insert(id, created.clone());
        Ok(created)
    }

    async fn store_session(
        &self,
        id: UserId,
        kind: TokenKind,
        session: StoredSession,
    ) -> RepoResult<()> {
        if let Some(user) = self.users.lock().get_mut(&id) {
            match kind {
                TokenKind::Access => user.access = Some(session),
                TokenKind::Refresh => user.refresh = Some(session),
            }
        }
        Ok(())
    }

    async fn store_sessions(
        &self,
        id: UserId,
        access: StoredSession,
        refresh: StoredSession,
    ) -> RepoResult<()> {
        if let Some(user) = self.users.lock().get_mut(&id) {
            user.access = Some(access);
            user.refresh = Some(refresh);
        }
        Ok(())
    }

    async fn clear_sessions(&self, id: UserId) -> RepoResult<()> {
        if let Some(user) = self.users.lock().get_mut(&id) {
            user.access = None;
            user.refresh = None;
        }
        Ok(())
    }
}

/// Posts kept in a Vec; deleted rows are dropped outright.
#[derive(Default)]
pub struct MemoryPostRepo {
    rows: Mutex<Vec<PostRow>>,
    next_id: AtomicI64,
}

fn paged<T>(rows: impl Iterator<Item = T>, page: Page) -> Vec<T> {
    rows.skip(page.offset as usize)
        .take(page.limit as usize)
        .collect()
}

#[async_trait]
impl ResourceRepo for MemoryPostRepo {
    type Row = PostRow;
    type Create = CreatePostRequest;
    type Update = UpdatePostRequest;

    const RESOURCE: &'static str = "Post";

    async fn list(&self, page: Page) -> RepoResult<Vec<PostRow>> {
        Ok(paged(self.rows.lock().iter().rev().cloned(), page))
    }

    async fn list_by_owner(&self, owner: UserId, page: Page) -> RepoResult<Vec<PostRow>> {
        let rows = self.rows.lock();
        Ok(paged(
            rows.iter().rev().filter(|r| r.user_id == owner).cloned(),
            page,
        ))
    }

    async fn get(&self, id: i64) -> RepoResult<Option<PostRow>> {
        Ok(self.rows.lock().iter().find(|r| r.id == id).cloned())
    }

    async fn create(&self, owner: UserId, input: &CreatePostRequest) -> RepoResult<PostRow> {
        let row = rows::post(self.next_id.fetch_add(1, Ordering::SeqCst) + 1, owner);
        let row = PostRow {
            title: input.title.clone(),
            content: input.content.clone(),
            ..row
        };
        self.rows.lock().push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: i64, input: &UpdatePostRequest) -> RepoResult<Option<PostRow>> {
        let mut rows = self.rows.lock();
        let Some(row) = rows.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        if let Some(title) = &input.title {
            row.title = title.clone();
        }
        if let Some(content) = &input.content {
            row.content = content.clone();
        }
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let mut rows = self.rows.lock();
        let before = rows.len();
        rows.retain(|r| r.id != id);
        Ok(rows.len() != before)
    }
}

/// Row constructors with fixed timestamps.
pub mod rows {
    use super::*;
    use crate::repos::{
        experience_repo::ExperienceRow, profile_repo::ProfileRow, project_repo::ProjectRow,
        social_media_repo::SocialMediaRow, tool_repo::ToolRow,
    };

    fn epoch() -> chrono::DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).single().unwrap_or_default()
    }

    pub fn post(id: i64, owner: UserId) -> PostRow {
        PostRow {
            id,
            title: "title".into(),
            content: "content".into(),
            user_id: owner,
            created_at: epoch(),
            updated_at: epoch(),
        }
    }

    pub fn project(id: i64, owner: UserId) -> ProjectRow {
        ProjectRow {
            id,
            name: "project".into(),
            description: String::new(),
            url: "https://example.com".into(),
            user_id: owner,
            created_at: epoch(),
            updated_at: epoch(),
        }
    }

    pub fn tool(id: i64, owner: UserId) -> ToolRow {
        ToolRow {
            id,
            name: "rust".into(),
            icon: String::new(),
            category: "language".into(),
            description: String::new(),
            user_id: owner,
            created_at: epoch(),
            updated_at: epoch(),
        }
    }

    pub fn profile(id: i64, owner: UserId) -> ProfileRow {
        ProfileRow {
            id,
            name: "Alice".into(),
            bio: String::new(),
            profile_image: String::new(),
            email: "alice@example.com".into(),
            phone: String::new(),
            location: String::new(),
            user_id: owner,
            created_at: epoch(),
            updated_at: epoch(),
        }
    }

    pub fn social_media(id: i64, owner: UserId) -> SocialMediaRow {
        SocialMediaRow {
            id,
            platform: "github".into(),
            url: "https://github.com/alice".into(),
            profile_id: 1,
            user_id: owner,
            created_at: epoch(),
            updated_at: epoch(),
        }
    }

    pub fn experience(id: i64, owner: UserId) -> ExperienceRow {
        ExperienceRow {
            id,
            title: "Engineer".into(),
            company: "Acme".into(),
            location: String::new(),
            start_date: epoch(),
            end_date: None,
            description: String::new(),
            tech_stack: vec!["rust".into()],
            user_id: owner,
            created_at: epoch(),
            updated_at: epoch(),
        }
    }
}

pub fn test_config() -> crate::config::Config {
    crate::config::Config {
        addr: std::net::SocketAddr::from(([127, 0, 0, 1], 0)),
        app_env: crate::config::AppEnv::Development,
        database_url: "postgres://localhost/unused".into(),
        database_max_connections: 1,
        cors_allowed_origins: Vec::new(),
        jwt_secret: TEST_SECRET.into(),
        access_token_ttl_seconds: 3600,
        refresh_token_ttl_seconds: 7200,
        rate_limit_per_minute: 100,
        rate_limit_burst: 100,
        trust_proxy_headers: false,
    }
}
