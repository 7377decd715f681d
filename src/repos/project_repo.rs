/*
 * Responsibility
 * - projects CRUD (soft delete)
 *
 * Schema
 *   projects(id BIGSERIAL PK, name TEXT, description TEXT, url TEXT,
 *            user_id BIGINT REFERENCES users(id),
 *            created_at, updated_at TIMESTAMPTZ, deleted_at TIMESTAMPTZ NULL)
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::api::v1::dto::projects::{CreateProjectRequest, UpdateProjectRequest};
use crate::repos::error::{RepoError, RepoResult};
use crate::repos::resource::{Page, ResourceRepo};
use crate::services::ownership::Owned;
use crate::types::UserId;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProjectRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub url: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for ProjectRow {
    fn owner_id(&self) -> UserId {
        self.user_id
    }
}

#[derive(Clone)]
pub struct ProjectRepo {
    db: PgPool,
}

impl ProjectRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ResourceRepo for ProjectRepo {
    type Row = ProjectRow;
    type Create = CreateProjectRequest;
    type Update = UpdateProjectRequest;

    const RESOURCE: &'static str = "Project";

    async fn list(&self, page: Page) -> RepoResult<Vec<ProjectRow>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, name, description, url, user_id, created_at, updated_at
            FROM projects
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

    async fn list_by_owner(&self, owner: UserId, page: Page) -> RepoResult<Vec<ProjectRow>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, name, description, url, user_id, created_at, updated_at
            FROM projects
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

    async fn get(&self, id: i64) -> RepoResult<Option<ProjectRow>> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, name, description, url, user_id, created_at, updated_at
            FROM projects
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    async fn create(&self, owner: UserId, input: &CreateProjectRequest) -> RepoResult<ProjectRow> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            INSERT INTO projects (name, description, url, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, url, user_id, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.url)
        .bind(owner)
        .fetch_one(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn update(
        &self,
        id: i64,
        input: &UpdateProjectRequest,
    ) -> RepoResult<Option<ProjectRow>> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            UPDATE projects
            SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                url = COALESCE($4, url),
                updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, name, description, url, user_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(input.name.as_deref())
        .bind(input.description.as_deref())
        .bind(input.url.as_deref())
        .fetch_optional(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE projects
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
