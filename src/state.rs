/*
 * Responsibility
 * - shared context for the Router (AppState); cheap to clone (Arc/pool inside)
 * - the token secret and the limiter map are explicit objects here, not globals
 */
use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::config::Config;
use crate::repos::{
    experience_repo::ExperienceRepo, post_repo::PostRepo, profile_repo::ProfileRepo,
    project_repo::ProjectRepo, social_media_repo::SocialMediaRepo, tool_repo::ToolRepo,
    user_repo::UserRepo,
};
use crate::services::auth::{
    gate::AuthGate, password::PasswordHasher, session_service::SessionService,
    token_codec::TokenCodec,
};
use crate::services::portfolio_service::PortfolioService;
use crate::services::rate_limiter::{RateLimitConfig, RateLimiter};
use crate::services::resource_service::ResourceService;
use crate::services::user_service::UserService;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub gate: Arc<AuthGate>,
    pub limiter: RateLimiter,
    pub sessions: SessionService,
    pub users: UserService,
    pub posts: ResourceService<PostRepo>,
    pub projects: ResourceService<ProjectRepo>,
    pub tools: ResourceService<ToolRepo>,
    pub profiles: ResourceService<ProfileRepo>,
    pub social_media: ResourceService<SocialMediaRepo>,
    pub experiences: ResourceService<ExperienceRepo>,
    pub portfolio: PortfolioService,
}

impl AppState {
    pub fn new(db: PgPool, config: &Config) -> Self {
        let codec = TokenCodec::new(&config.jwt_secret);
        let hasher = PasswordHasher::default();

        let user_repo = UserRepo::new(db.clone());
        let credentials = Arc::new(user_repo.clone());

        let gate = Arc::new(AuthGate::new(codec.clone(), credentials.clone()));
        let sessions = SessionService::new(
            codec,
            credentials,
            hasher,
            Duration::from_secs(config.access_token_ttl_seconds),
            Duration::from_secs(config.refresh_token_ttl_seconds),
        );
        let limiter = RateLimiter::new(RateLimitConfig {
            requests_per_minute: config.rate_limit_per_minute,
            burst: config.rate_limit_burst,
        });

        let posts = ResourceService::new(PostRepo::new(db.clone()));
        let projects = ResourceService::new(ProjectRepo::new(db.clone()));
        let tools = ResourceService::new(ToolRepo::new(db.clone()));
        let profiles = ResourceService::new(ProfileRepo::new(db.clone()));
        let social_media = ResourceService::new(SocialMediaRepo::new(db.clone()));
        let experiences = ResourceService::new(ExperienceRepo::new(db.clone()));

        let portfolio = PortfolioService {
            profiles: profiles.clone(),
            posts: posts.clone(),
            projects: projects.clone(),
            social_media: social_media.clone(),
            tools: tools.clone(),
            experiences: experiences.clone(),
        };

        Self {
            db,
            gate,
            limiter,
            sessions,
            users: UserService::new(user_repo, hasher),
            posts,
            projects,
            tools,
            profiles,
            social_media,
            experiences,
            portfolio,
        }
    }
}

// lets generic handlers take State<ResourceService<R>>
macro_rules! resource_state {
    ($($field:ident: $repo:ty),* $(,)?) => {
        $(
            impl FromRef<AppState> for ResourceService<$repo> {
                fn from_ref(state: &AppState) -> Self {
                    state.$field.clone()
                }
            }
        )*
    };
}

resource_state! {
    posts: PostRepo,
    projects: ProjectRepo,
    tools: ToolRepo,
    profiles: ProfileRepo,
    social_media: SocialMediaRepo,
    experiences: ExperienceRepo,
}
