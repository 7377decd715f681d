/*
 * Responsibility
 * - experiences CRUD (soft delete)
 * - end_date NULL means "current position"; ordering puts current ones first
 *
 * Schema
 *   experiences(id BIGSERIAL PK, title TEXT, company TEXT, location TEXT,
 *               start_date TIMESTAMPTZ, end_date TIMESTAMPTZ NULL,
 *               description TEXT, tech_stack TEXT[],
 *               user_id BIGINT REFERENCES users(id),
 *               created_at, updated_at TIMESTAMPTZ, deleted_at TIMESTAMPTZ NULL)
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::api::v1::dto::experiences::{CreateExperienceRequest, UpdateExperienceRequest};
use crate::repos::error::{RepoError, RepoResult};
use crate::repos::resource::{Page, ResourceRepo};
use crate::services::ownership::Owned;
use crate::types::UserId;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ExperienceRow {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub location: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub description: String,
    pub tech_stack: Vec<String>,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for ExperienceRow {
    fn owner_id(&self) -> UserId {
        self.user_id
    }
}

#[derive(Clone)]
pub struct ExperienceRepo {
    db: PgPool,
}

impl ExperienceRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ResourceRepo for ExperienceRepo {
    type Row = ExperienceRow;
    type Create = CreateExperienceRequest;
    type Update = UpdateExperienceRequest;

    const RESOURCE: &'static str = "Experience";

    async fn list(&self, page: Page) -> RepoResult<Vec<ExperienceRow>> {
        let rows = sqlx::query_as::<_, ExperienceRow>(
            r#"
            SELECT id, title, company, location, start_date, end_date,
                   description, tech_stack, user_id, created_at, updated_at
            FROM experiences
            WHERE deleted_at IS NULL
            ORDER BY end_date DESC NULLS FIRST, start_date DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    async fn list_by_owner(&self, owner: UserId, page: Page) -> RepoResult<Vec<ExperienceRow>> {
        let rows = sqlx::query_as::<_, ExperienceRow>(
            r#"
            SELECT id, title, company, location, start_date, end_date,
                   description, tech_stack, user_id, created_at, updated_at
            FROM experiences
            WHERE user_id = $1 AND deleted_at IS NULL
            ORDER BY end_date DESC NULLS FIRST, start_date DESC
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

    async fn get(&self, id: i64) -> RepoResult<Option<ExperienceRow>> {
        let row = sqlx::query_as::<_, ExperienceRow>(
            r#"
            SELECT id, title, company, location, start_date, end_date,
                   description, tech_stack, user_id, created_at, updated_at
            FROM experiences
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    async fn create(
        &self,
        owner: UserId,
        input: &CreateExperienceRequest,
    ) -> RepoResult<ExperienceRow> {
        let row = sqlx::query_as::<_, ExperienceRow>(
            r#"
            INSERT INTO experiences
                (title, company, location, start_date, end_date, description, tech_stack, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, title, company, location, start_date, end_date,
                      description, tech_stack, user_id, created_at, updated_at
            "#,
        )
        .bind(&input.title)
        .bind(&input.company)
        .bind(&input.location)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(&input.description)
        .bind(&input.tech_stack)
        .bind(owner)
        .fetch_one(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn update(
        &self,
        id: i64,
        input: &UpdateExperienceRequest,
    ) -> RepoResult<Option<ExperienceRow>> {
        // end_date is tri-state: $6 says whether to touch it, $7 is the new value (may be NULL)
        let row = sqlx::query_as::<_, ExperienceRow>(
            r#"
            UPDATE experiences
            SET
                title = COALESCE($2, title),
                company = COALESCE($3, company),
                location = COALESCE($4, location),
                start_date = COALESCE($5, start_date),
                end_date = CASE WHEN $6 THEN $7 ELSE end_date END,
                description = COALESCE($8, description),
                tech_stack = COALESCE($9, tech_stack),
                updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, title, company, location, start_date, end_date,
                      description, tech_stack, user_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(input.title.as_deref())
        .bind(input.company.as_deref())
        .bind(input.location.as_deref())
        .bind(input.start_date)
        .bind(input.end_date.is_some())
        .bind(input.end_date.flatten())
        .bind(input.description.as_deref())
        .bind(input.tech_stack.as_deref())
        .fetch_optional(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE experiences
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
