/*
 * Responsibility
 * - Users request/response DTOs
 * - the password hash never leaves the service layer
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Validate, auth::MIN_PASSWORD_LEN, not_blank};
use crate::repos::user_repo::UserRow;
use crate::types::{Role, UserId};

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub password: Option<String>,
}

impl Validate for UpdateUserRequest {
    fn validate(&self) -> Result<(), &'static str> {
        not_blank(&self.name, "name cannot be empty")?;
        if let Some(password) = &self.password
            && password.chars().count() < MIN_PASSWORD_LEN
        {
            return Err("password must be at least 6 characters");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
