pub mod auth;
pub mod ownership;
pub mod portfolio_service;
pub mod rate_limiter;
pub mod resource_service;
pub mod user_service;
