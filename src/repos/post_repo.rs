/*
 * Responsibility
 * - posts CRUD (soft delete)
 *
 * Schema
 *   posts(id BIGSERIAL PK, title TEXT, content TEXT,
 *         user_id BIGINT REFERENCES users(id),
 *         created_at, updated_at TIMESTAMPTZ, deleted_at TIMESTAMPTZ NULL)
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::api::v1::dto::posts::{CreatePostRequest, UpdatePostRequest};
use crate::repos::error::{RepoError, RepoResult};
use crate::repos::resource::{Page, ResourceRepo};
use crate::services::ownership::Owned;
use crate::types::UserId;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PostRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for PostRow {
    fn owner_id(&self) -> UserId {
        self.user_id
    }
}

#[derive(Clone)]
pub struct PostRepo {
    db: PgPool,
}

impl PostRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ResourceRepo for PostRepo {
    type Row = PostRow;
    type Create = CreatePostRequest;
    type Update = UpdatePostRequest;

    const RESOURCE: &'static str = "Post";

    async fn list(&self, page: Page) -> RepoResult<Vec<PostRow>> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, title, content, user_id, created_at, updated_at
            FROM posts
            WHERE deleted_at IS NULL
            ORDER BY id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    async fn list_by_owner(&self, owner: UserId, page: Page) -> RepoResult<Vec<PostRow>> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, title, content, user_id, created_at, updated_at
            FROM posts
            WHERE user_id = $1 AND deleted_at IS NULL
            ORDER BY id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    async fn get(&self, id: i64) -> RepoResult<Option<PostRow>> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, title, content, user_id, created_at, updated_at
            FROM posts
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    async fn create(&self, owner: UserId, input: &CreatePostRequest) -> RepoResult<PostRow> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (title, content, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, content, user_id, created_at, updated_at
            "#,
        )
        .bind(&input.title)
        .bind(&input.content)
        .bind(owner)
        .fetch_one(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn update(&self, id: i64, input: &UpdatePostRequest) -> RepoResult<Option<PostRow>> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            UPDATE posts
            SET
                title = COALESCE($2, title),
                content = COALESCE($3, content),
                updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, title, content, user_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(input.title.as_deref())
        .bind(input.content.as_deref())
        .fetch_optional(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET deleted_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
