/*
 * Responsibility
 * - read-only aggregation of one user's published resources
 * - the per-resource reads run concurrently; the first error wins
 */
use crate::api::v1::dto::portfolio::{PortfolioResponse, PortfolioSummary};
use crate::error::AppError;
use crate::repos::{
    experience_repo::ExperienceRepo, post_repo::PostRepo, profile_repo::ProfileRepo,
    project_repo::ProjectRepo, resource::Page, social_media_repo::SocialMediaRepo,
    tool_repo::ToolRepo,
};
use crate::services::resource_service::ResourceService;
use crate::types::UserId;

#[derive(Clone)]
pub struct PortfolioService {
    pub profiles: ResourceService<ProfileRepo>,
    pub posts: ResourceService<PostRepo>,
    pub projects: ResourceService<ProjectRepo>,
    pub social_media: ResourceService<SocialMediaRepo>,
    pub tools: ResourceService<ToolRepo>,
    pub experiences: ResourceService<ExperienceRepo>,
}

impl PortfolioService {
    pub async fn for_user(&self, user_id: UserId) -> Result<PortfolioResponse, AppError> {
        let page = Page::new(1, Page::MAX_LIMIT);

        let (profile, posts, projects, social_media, tools, experiences) = tokio::try_join!(
            async {
                self.profiles
                    .repo()
                    .find_by_owner(user_id)
                    .await
                    .map_err(AppError::from)
            },
            self.posts.list_by_owner(user_id, page),
            self.projects.list_by_owner(user_id, page),
            self.social_media.list_by_owner(user_id, page),
            self.tools.list_by_owner(user_id, page),
            self.experiences.list_by_owner(user_id, page),
        )?;

        let profile = profile.ok_or(AppError::not_found("Portfolio"))?;

        Ok(PortfolioResponse {
            profile,
            posts,
            projects,
            social_media,
            tools,
            experiences,
        })
    }

    pub async fn summaries(&self, page: Page) -> Result<Vec<PortfolioSummary>, AppError> {
        let profiles = self.profiles.list(page).await?;
        Ok(profiles.into_iter().map(PortfolioSummary::from).collect())
    }
}
