/*
 * Responsibility
 * - the v1 URL structure
 * - which routes sit behind which token kind (route_layer per sub-router)
 */
use std::sync::Arc;

use axum::{
    Router,
    extract::FromRef,
    routing::{get, post, put},
};

use crate::api::v1::handlers::{auth, health::health, portfolio, resources, users};
use crate::middleware::auth::access;
use crate::repos::{
    experience_repo::ExperienceRepo, post_repo::PostRepo, profile_repo::ProfileRepo,
    project_repo::ProjectRepo, resource::ResourceRepo, social_media_repo::SocialMediaRepo,
    tool_repo::ToolRepo,
};
use crate::services::auth::{gate::AuthGate, token_codec::TokenKind};
use crate::services::resource_service::ResourceService;
use crate::state::AppState;

fn auth_routes(gate: &Arc<AuthGate>) -> Router<AppState> {
    let public = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let with_access = access::apply(
        Router::new()
            .route("/logout", post(auth::logout))
            .route("/me", get(auth::me)),
        gate.clone(),
        TokenKind::Access,
    );

    let with_refresh = access::apply(
        Router::new().route("/refresh", post(auth::refresh)),
        gate.clone(),
        TokenKind::Refresh,
    );

    public.merge(with_access).merge(with_refresh)
}

fn user_routes(gate: &Arc<AuthGate>) -> Router<AppState> {
    let public = Router::new().route("/", get(users::list_users));

    let protected = access::apply(
        Router::new().route(
            "/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        ),
        gate.clone(),
        TokenKind::Access,
    );

    public.merge(protected)
}

/// Reads are public; writes need an access token (and ownership, checked in the service).
fn resource_routes<R>(gate: &Arc<AuthGate>) -> Router<AppState>
where
    R: ResourceRepo,
    ResourceService<R>: FromRef<AppState>,
{
    let public = Router::new()
        .route("/", get(resources::list::<R>))
        .route("/{id}", get(resources::get::<R>))
        .route("/user/{user_id}", get(resources::list_by_owner::<R>));

    let protected = access::apply(
        Router::new().route("/", post(resources::create::<R>)).route(
            "/{id}",
            put(resources::update::<R>).delete(resources::delete::<R>),
        ),
        gate.clone(),
        TokenKind::Access,
    );

    public.merge(protected)
}

pub fn routes(gate: &Arc<AuthGate>) -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth_routes(gate))
        .nest("/users", user_routes(gate))
        .nest("/posts", resource_routes::<PostRepo>(gate))
        .nest("/projects", resource_routes::<ProjectRepo>(gate))
        .nest("/tools", resource_routes::<ToolRepo>(gate))
        .nest("/profiles", resource_routes::<ProfileRepo>(gate))
        .nest("/social-media", resource_routes::<SocialMediaRepo>(gate))
        .nest("/experiences", resource_routes::<ExperienceRepo>(gate))
        .route("/portfolios", get(portfolio::list_portfolios))
        .route("/portfolios/{user_id}", get(portfolio::get_portfolio))
}
