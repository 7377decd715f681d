/*
 * Responsibility
 * - the CRUD flow shared by every owned resource
 * - mutations: load (404) -> authorize owner (403) -> write
 */
use std::sync::Arc;

use crate::api::v1::dto::Validate;
use crate::error::AppError;
use crate::repos::resource::{Page, ResourceRepo};
use crate::services::auth::gate::Principal;
use crate::services::ownership::authorize_mutation;
use crate::types::UserId;

pub struct ResourceService<R> {
    repo: Arc<R>,
}

impl<R> Clone for ResourceService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<R: ResourceRepo> ResourceService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo: Arc::new(repo),
        }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub async fn list(&self, page: Page) -> Result<Vec<R::Row>, AppError> {
        Ok(self.repo.list(page).await?)
    }

    pub async fn list_by_owner(&self, owner: UserId, page: Page) -> Result<Vec<R::Row>, AppError> {
        Ok(self.repo.list_by_owner(owner, page).await?)
    }

    pub async fn get(&self, id: i64) -> Result<R::Row, AppError> {
        self.repo
            .get(id)
            .await?
            .ok_or(AppError::not_found(R::RESOURCE))
    }

    /// The owner is always the caller.
    pub async fn create(&self, principal: &Principal, input: R::Create) -> Result<R::Row, AppError> {
        input.validate().map_err(AppError::bad_request)?;
        let row = self.repo.create(principal.id, &input).await?;
        tracing::info!(resource = R::RESOURCE, user_id = %principal.id, "created");
        Ok(row)
    }

    pub async fn update(
        &self,
        principal: &Principal,
        id: i64,
        input: R::Update,
    ) -> Result<R::Row, AppError> {
        input.validate().map_err(AppError::bad_request)?;

        let existing = self.get(id).await?;
        authorize_mutation(&existing, principal.id)?;

        // gone between the read and the write
        self.repo
            .update(id, &input)
            .await?
            .ok_or(AppError::not_found(R::RESOURCE))
    }

    pub async fn delete(&self, principal: &Principal, id: i64) -> Result<(), AppError> {
        let existing = self.get(id).await?;
        authorize_mutation(&existing, principal.id)?;

        if !self.repo.delete(id).await? {
            return Err(AppError::not_found(R::RESOURCE));
        }
        tracing::info!(resource = R::RESOURCE, id, user_id = %principal.id, "deleted");
        Ok(())
    }
}
