/*
 * Responsibility
 * - social media links CRUD (soft delete)
 * - a link hangs off a profile; profile_id is set at create only
 *
 * Schema
 *   social_media(id BIGSERIAL PK, platform TEXT, url TEXT,
 *                profile_id BIGINT REFERENCES profiles(id),
 *                user_id BIGINT REFERENCES users(id),
 *                created_at, updated_at TIMESTAMPTZ, deleted_at TIMESTAMPTZ NULL)
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::api::v1::dto::social_media::{CreateSocialMediaRequest, UpdateSocialMediaRequest};
use crate::repos::error::{RepoError, RepoResult};
use crate::repos::resource::{Page, ResourceRepo};
use crate::services::ownership::Owned;
use crate::types::UserId;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SocialMediaRow {
    pub id: i64,
    pub platform: String,
    pub url: String,
    pub profile_id: i64,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for SocialMediaRow {
    fn owner_id(&self) -> UserId {
        self.user_id
    }
}

#[derive(Clone)]
pub struct SocialMediaRepo {
    db: PgPool,
}

impl SocialMediaRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ResourceRepo for SocialMediaRepo {
    type Row = SocialMediaRow;
    type Create = CreateSocialMediaRequest;
    type Update = UpdateSocialMediaRequest;

    const RESOURCE: &'static str = "Social media";

    async fn list(&self, page: Page) -> RepoResult<Vec<SocialMediaRow>> {
        let rows = sqlx::query_as::<_, SocialMediaRow>(
            r#"
            SELECT id, platform, url, profile_id, user_id, created_at, updated_at
            FROM social_media
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

    async fn list_by_owner(&self, owner: UserId, page: Page) -> RepoResult<Vec<SocialMediaRow>> {
        let rows = sqlx::query_as::<_, SocialMediaRow>(
            r#"
            SELECT id, platform, url, profile_id, user_id, created_at, updated_at
            FROM social_media
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

    async fn get(&self, id: i64) -> RepoResult<Option<SocialMediaRow>> {
        let row = sqlx::query_as::<_, SocialMediaRow>(
            r#"
            SELECT id, platform, url, profile_id, user_id, created_at, updated_at
            FROM social_media
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
        input: &CreateSocialMediaRequest,
    ) -> RepoResult<SocialMediaRow> {
        // the profile must be live and belong to the same user
        let row = sqlx::query_as::<_, SocialMediaRow>(
            r#"
            INSERT INTO social_media (platform, url, profile_id, user_id)
            SELECT $1, $2, p.id, $4
            FROM profiles p
            WHERE p.id = $3 AND p.user_id = $4 AND p.deleted_at IS NULL
            RETURNING id, platform, url, profile_id, user_id, created_at, updated_at
            "#,
        )
        .bind(&input.platform)
        .bind(&input.url)
        .bind(input.profile_id)
        .bind(owner)
        .fetch_optional(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        row.ok_or(RepoError::MissingParent("profile"))
    }

    async fn update(
        &self,
        id: i64,
        input: &UpdateSocialMediaRequest,
    ) -> RepoResult<Option<SocialMediaRow>> {
        let row = sqlx::query_as::<_, SocialMediaRow>(
            r#"
            UPDATE social_media
            SET
                platform = COALESCE($2, platform),
                url = COALESCE($3, url),
                updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, platform, url, profile_id, user_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(input.platform.as_deref())
        .bind(input.url.as_deref())
        .fetch_optional(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE social_media
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
