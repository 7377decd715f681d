/*
 * Responsibility
 * - register / login request DTOs and the token response
 */
use serde::{Deserialize, Serialize};

use super::{Validate, looks_like_email, required};
use crate::services::auth::session_service::IssuedTokens;
use crate::types::UserId;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), &'static str> {
        required(&self.name, "name is required")?;
        if !looks_like_email(&self.email) {
            return Err("email is not valid");
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err("password must be at least 6 characters");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), &'static str> {
        if !looks_like_email(&self.email) {
            return Err("email is not valid");
        }
        required(&self.password, "password is required")
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub user_id: UserId,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

impl From<IssuedTokens> for TokenResponse {
    fn from(t: IssuedTokens) -> Self {
        Self {
            user_id: t.user_id,
            access_token: t.access_token,
            refresh_token: t.refresh_token,
            token_type: t.token_type,
            expires_in: t.expires_in,
        }
    }
}
