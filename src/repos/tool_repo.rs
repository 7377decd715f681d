/*
 * Responsibility
 * - tools CRUD (soft delete)
 *
 * Schema
 *   tools(id BIGSERIAL PK, name TEXT, icon TEXT, category TEXT, description TEXT,
 *         user_id BIGINT REFERENCES users(id),
 *         created_at, updated_at TIMESTAMPTZ, deleted_at TIMESTAMPTZ NULL)
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::api::v1::dto::tools::{CreateToolRequest, UpdateToolRequest};
use crate::repos::error::{RepoError, RepoResult};
use crate::repos::resource::{Page, ResourceRepo};
use crate::services::ownership::Owned;
use crate::types::UserId;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ToolRow {
    pub id: i64,
    pub name: String,
    pub icon: String,
    pub category: String,
    pub description: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for ToolRow {
    fn owner_id(&self) -> UserId {
        self.user_id
    }
}

#[derive(Clone)]
pub struct ToolRepo {
    db: PgPool,
}

impl ToolRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ResourceRepo for ToolRepo {
    type Row = ToolRow;
    type Create = CreateToolRequest;
    type Update = UpdateToolRequest;

    const RESOURCE: &'static str = "Tool";

    async fn list(&self, page: Page) -> RepoResult<Vec<ToolRow>> {
        let rows = sqlx::query_as::<_, ToolRow>(
            r#"
            SELECT id, name, icon, category, description, user_id, created_at, updated_at
            FROM tools
            WHERE deleted_at IS NULL
            ORDER BY category, name
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    async fn list_by_owner(&self, owner: UserId, page: Page) -> RepoResult<Vec<ToolRow>> {
        let rows = sqlx::query_as::<_, ToolRow>(
            r#"
            SELECT id, name, icon, category, description, user_id, created_at, updated_at
            FROM tools
            WHERE user_id = $1 AND deleted_at IS NULL
            ORDER BY category, name
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

    async fn get(&self, id: i64) -> RepoResult<Option<ToolRow>> {
        let row = sqlx::query_as::<_, ToolRow>(
            r#"
            SELECT id, name, icon, category, description, user_id, created_at, updated_at
            FROM tools
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    async fn create(&self, owner: UserId, input: &CreateToolRequest) -> RepoResult<ToolRow> {
        let row = sqlx::query_as::<_, ToolRow>(
            r#"
            INSERT INTO tools (name, icon, category, description, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, icon, category, description, user_id, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.icon)
        .bind(&input.category)
        .bind(&input.description)
        .bind(owner)
        .fetch_one(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn update(&self, id: i64, input: &UpdateToolRequest) -> RepoResult<Option<ToolRow>> {
        let row = sqlx::query_as::<_, ToolRow>(
            r#"
            UPDATE tools
            SET
                name = COALESCE($2, name),
                icon = COALESCE($3, icon),
                category = COALESCE($4, category),
                description = COALESCE($5, description),
                updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, name, icon, category, description, user_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(input.name.as_deref())
        .bind(input.icon.as_deref())
        .bind(input.category.as_deref())
        .bind(input.description.as_deref())
        .fetch_optional(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE tools
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
