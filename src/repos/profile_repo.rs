/*
 * Responsibility
 * - profiles CRUD (soft delete)
 * - one live profile per user: a second insert surfaces as RepoError::Conflict
 *
 * Schema
 *   profiles(id BIGSERIAL PK, name TEXT, bio TEXT, profile_image TEXT,
 *            email TEXT, phone TEXT, location TEXT,
 *            user_id BIGINT REFERENCES users(id),
 *            created_at, updated_at TIMESTAMPTZ, deleted_at TIMESTAMPTZ NULL)
 *   UNIQUE INDEX ON profiles(user_id) WHERE deleted_at IS NULL
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::api::v1::dto::profiles::{CreateProfileRequest, UpdateProfileRequest};
use crate::repos::error::{RepoError, RepoResult};
use crate::repos::resource::{Page, ResourceRepo};
use crate::services::ownership::Owned;
use crate::types::UserId;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProfileRow {
    pub id: i64,
    pub name: String,
    pub bio: String,
    pub profile_image: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for ProfileRow {
    fn owner_id(&self) -> UserId {
        self.user_id
    }
}

#[derive(Clone)]
pub struct ProfileRepo {
    db: PgPool,
}

impl ProfileRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn find_by_owner(&self, owner: UserId) -> RepoResult<Option<ProfileRow>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, name, bio, profile_image, email, phone, location,
                   user_id, created_at, updated_at
            FROM profiles
            WHERE user_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(owner)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }
}

#[async_trait]
impl ResourceRepo for ProfileRepo {
    type Row = ProfileRow;
    type Create = CreateProfileRequest;
    type Update = UpdateProfileRequest;

    const RESOURCE: &'static str = "Profile";

    async fn list(&self, page: Page) -> RepoResult<Vec<ProfileRow>> {
        let rows = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, name, bio, profile_image, email, phone, location,
                   user_id, created_at, updated_at
            FROM profiles
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

    async fn list_by_owner(&self, owner: UserId, page: Page) -> RepoResult<Vec<ProfileRow>> {
        let rows = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, name, bio, profile_image, email, phone, location,
                   user_id, created_at, updated_at
            FROM profiles
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

    async fn get(&self, id: i64) -> RepoResult<Option<ProfileRow>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, name, bio, profile_image, email, phone, location,
                   user_id, created_at, updated_at
            FROM profiles
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }

    async fn create(&self, owner: UserId, input: &CreateProfileRequest) -> RepoResult<ProfileRow> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            INSERT INTO profiles (name, bio, profile_image, email, phone, location, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, bio, profile_image, email, phone, location,
                      user_id, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.bio)
        .bind(&input.profile_image)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.location)
        .bind(owner)
        .fetch_one(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn update(
        &self,
        id: i64,
        input: &UpdateProfileRequest,
    ) -> RepoResult<Option<ProfileRow>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            UPDATE profiles
            SET
                name = COALESCE($2, name),
                bio = COALESCE($3, bio),
                profile_image = COALESCE($4, profile_image),
                email = COALESCE($5, email),
                phone = COALESCE($6, phone),
                location = COALESCE($7, location),
                updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, name, bio, profile_image, email, phone, location,
                      user_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(input.name.as_deref())
        .bind(input.bio.as_deref())
        .bind(input.profile_image.as_deref())
        .bind(input.email.as_deref())
        .bind(input.phone.as_deref())
        .bind(input.location.as_deref())
        .fetch_optional(&self.db)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
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
