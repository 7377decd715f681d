use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::Deserialize;

use crate::error::AppError;
use crate::repos::resource::Page;

#[derive(Debug, Default, Deserialize)]
struct PageQuery {
    page: Option<i64>,
    limit: Option<i64>,
}

/// `?page=&limit=` (defaults 1 and 10; limit capped at 100).
#[derive(Debug, Clone, Copy)]
pub struct Pagination(pub Page);

impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(q) = Query::<PageQuery>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::bad_request("page and limit must be integers"))?;

        Ok(Pagination(Page::new(
            q.page.unwrap_or(1),
            q.limit.unwrap_or(Page::DEFAULT_LIMIT),
        )))
    }
}
