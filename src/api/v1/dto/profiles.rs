/*
 * Responsibility
 * - Profile request DTOs (one profile per user; the DB enforces uniqueness)
 */
use serde::Deserialize;

use super::{Validate, looks_like_email, not_blank, required};

fn optional_email(value: &str) -> bool {
    value.is_empty() || looks_like_email(value)
}

#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    pub name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub profile_image: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
}

impl Validate for CreateProfileRequest {
    fn validate(&self) -> Result<(), &'static str> {
        required(&self.name, "name is required")?;
        if !optional_email(&self.email) {
            return Err("email is not valid");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub profile_image: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
}

impl Validate for UpdateProfileRequest {
    fn validate(&self) -> Result<(), &'static str> {
        not_blank(&self.name, "name cannot be empty")?;
        if let Some(email) = &self.email
            && !optional_email(email)
        {
            return Err("email is not valid");
        }
        Ok(())
    }
}
