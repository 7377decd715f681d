use serde::Deserialize;

use super::{Validate, not_blank, required};

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
}

impl Validate for CreateProjectRequest {
    fn validate(&self) -> Result<(), &'static str> {
        required(&self.name, "name is required")?;
        if self.url.len() > 2048 {
            return Err("url must be <= 2048 chars");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

impl Validate for UpdateProjectRequest {
    fn validate(&self) -> Result<(), &'static str> {
        not_blank(&self.name, "name cannot be empty")?;
        if let Some(url) = &self.url
            && url.len() > 2048
        {
            return Err("url must be <= 2048 chars");
        }
        Ok(())
    }
}
