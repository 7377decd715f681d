pub mod error;
pub mod experience_repo;
pub mod post_repo;
pub mod profile_repo;
pub mod project_repo;
pub mod resource;
pub mod social_media_repo;
pub mod tool_repo;
pub mod user_repo;
