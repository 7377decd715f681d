/*
 * Responsibility
 * - Posts request DTOs
 * - the author is the authenticated principal, never a body field
 */
use serde::Deserialize;

use super::{Validate, not_blank, required};

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

impl Validate for CreatePostRequest {
    fn validate(&self) -> Result<(), &'static str> {
        required(&self.title, "title is required")?;
        required(&self.content, "content is required")?;
        if self.title.len() > 255 {
            return Err("title must be <= 255 chars");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl Validate for UpdatePostRequest {
    fn validate(&self) -> Result<(), &'static str> {
        not_blank(&self.title, "title cannot be empty")?;
        not_blank(&self.content, "content cannot be empty")?;
        if let Some(title) = &self.title
            && title.len() > 255
        {
            return Err("title must be <= 255 chars");
        }
        Ok(())
    }
}
