use serde::Deserialize;

use super::{Validate, not_blank, required};

#[derive(Debug, Deserialize)]
pub struct CreateSocialMediaRequest {
    pub platform: String,
    pub url: String,
    pub profile_id: i64,
}

impl Validate for CreateSocialMediaRequest {
    fn validate(&self) -> Result<(), &'static str> {
        required(&self.platform, "platform is required")?;
        required(&self.url, "url is required")?;
        if self.profile_id <= 0 {
            return Err("profile_id is required");
        }
        Ok(())
    }
}

// profile_id is fixed once the entry exists.
#[derive(Debug, Deserialize)]
pub struct UpdateSocialMediaRequest {
    pub platform: Option<String>,
    pub url: Option<String>,
}

impl Validate for UpdateSocialMediaRequest {
    fn validate(&self) -> Result<(), &'static str> {
        not_blank(&self.platform, "platform cannot be empty")?;
        not_blank(&self.url, "url cannot be empty")
    }
}
