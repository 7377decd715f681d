/*
 * Responsibility
 * - the numeric id in the last path segment (`/posts/{id}`, `/users/{user_id}`)
 * - non-numeric or non-positive ids are a 400 in the JSON envelope
 */
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use crate::error::AppError;
use crate::types::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathId(pub i64);

impl PathId {
    pub fn as_user(self) -> UserId {
        UserId(self.0)
    }
}

impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::bad_request("missing id in path"))?;

        match raw.parse::<i64>() {
            Ok(id) if id > 0 => Ok(PathId(id)),
            _ => Err(AppError::bad_request("id must be a positive integer")),
        }
    }
}
