use serde::Deserialize;

use super::{Validate, not_blank, required};

#[derive(Debug, Deserialize)]
pub struct CreateToolRequest {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
}

impl Validate for CreateToolRequest {
    fn validate(&self) -> Result<(), &'static str> {
        required(&self.name, "name is required")?;
        required(&self.category, "category is required")
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateToolRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub icon: Option<String>,
    pub description: Option<String>,
}

impl Validate for UpdateToolRequest {
    fn validate(&self) -> Result<(), &'static str> {
        not_blank(&self.name, "name cannot be empty")?;
        not_blank(&self.category, "category cannot be empty")
    }
}
