/*
 * Responsibility
 * - the contract every owned-resource repository implements (posts, projects, tools, ...)
 * - lets ResourceService / the generic handlers stay written once
 *
 * Notes
 * - rows are soft-deleted (deleted_at); every read filters them out
 * - user_id is written by create() only; update() never touches it
 */
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::api::v1::dto::Validate;
use crate::repos::error::RepoResult;
use crate::services::ownership::Owned;
use crate::types::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const MAX_LIMIT: i64 = 100;

    /// 1-based page number; both values are clamped into range.
    pub fn new(page: i64, limit: i64) -> Self {
        let page = page.max(1);
        let limit = limit.clamp(1, Self::MAX_LIMIT);
        Self {
            limit,
            offset: (page - 1) * limit,
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_LIMIT)
    }
}

#[async_trait]
pub trait ResourceRepo: Send + Sync + 'static {
    type Row: Owned + Serialize + Send + Sync + 'static;
    type Create: DeserializeOwned + Validate + Send + Sync + 'static;
    type Update: DeserializeOwned + Validate + Send + Sync + 'static;

    /// Name used in "not found" messages.
    const RESOURCE: &'static str;

    async fn list(&self, page: Page) -> RepoResult<Vec<Self::Row>>;

    async fn list_by_owner(&self, owner: UserId, page: Page) -> RepoResult<Vec<Self::Row>>;

    async fn get(&self, id: i64) -> RepoResult<Option<Self::Row>>;

    async fn create(&self, owner: UserId, input: &Self::Create) -> RepoResult<Self::Row>;

    async fn update(&self, id: i64, input: &Self::Update) -> RepoResult<Option<Self::Row>>;

    async fn delete(&self, id: i64) -> RepoResult<bool>;
}
