use serde::Serialize;

use crate::repos::{
    experience_repo::ExperienceRow, post_repo::PostRow, profile_repo::ProfileRow,
    project_repo::ProjectRow, social_media_repo::SocialMediaRow, tool_repo::ToolRow,
};
use crate::types::UserId;

/// Everything a user has published, assembled for one page.
#[derive(Debug, Serialize)]
pub struct PortfolioResponse {
    pub profile: ProfileRow,
    pub posts: Vec<PostRow>,
    pub projects: Vec<ProjectRow>,
    pub social_media: Vec<SocialMediaRow>,
    pub tools: Vec<ToolRow>,
    pub experiences: Vec<ExperienceRow>,
}

#[derive(Debug, Serialize)]
pub struct PortfolioSummary {
    pub user_id: UserId,
    pub name: String,
    pub profile_image: String,
    pub bio: String,
}

impl From<ProfileRow> for PortfolioSummary {
    fn from(p: ProfileRow) -> Self {
        Self {
            user_id: p.user_id,
            name: p.name,
            profile_image: p.profile_image,
            bio: p.bio,
        }
    }
}
