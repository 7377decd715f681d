/*
 * Responsibility
 * - Experience request DTOs
 * - end_date is nullable (current position); updates use the tri-state form
 */
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{Validate, double_option, not_blank, required};

#[derive(Debug, Deserialize)]
pub struct CreateExperienceRequest {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tech_stack: Vec<String>,
}

impl Validate for CreateExperienceRequest {
    fn validate(&self) -> Result<(), &'static str> {
        required(&self.title, "title is required")?;
        required(&self.company, "company is required")?;
        if let Some(end) = self.end_date
            && end < self.start_date
        {
            return Err("end_date must not be before start_date");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateExperienceRequest {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub description: Option<String>,
    pub tech_stack: Option<Vec<String>>,
}

impl Validate for UpdateExperienceRequest {
    fn validate(&self) -> Result<(), &'static str> {
        not_blank(&self.title, "title cannot be empty")?;
        not_blank(&self.company, "company cannot be empty")?;
        if let (Some(start), Some(Some(end))) = (self.start_date, self.end_date)
            && end < start
        {
            return Err("end_date must not be before start_date");
        }
        Ok(())
    }
}
