/*
 * Responsibility
 * - Config -> dependencies -> Router
 * - middleware order (outermost first): http (request id, trace, body limit,
 *   timeout), rate limit, CORS, then per-route auth gates
 * - the rate limit sees every request, including preflights and unmatched paths
 * - axum::serve() with peer addresses for the rate limiter
 */
use std::net::SocketAddr;
use std::time::Duration;
use std::{panic, process};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::api::v1::response::ApiResponse;
use crate::config::Config;
use crate::middleware::{self, http::HttpLimits};
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG wins when set, e.g. RUST_LOG=info,portfolio_api=debug,tower_http=debug
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: crash loudly; production: default hook, keep serving
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let db = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
        .context("failed to connect to the database")?;

    let state = AppState::new(db, &config);
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}

async fn not_found() -> ApiResponse<()> {
    ApiResponse::failure(
        axum::http::StatusCode::NOT_FOUND,
        "Not found",
        "no route matches this path",
    )
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let limiter = state.limiter.clone();

    let router = Router::new()
        .nest("/api/v1", api::v1::routes(&state.gate))
        .fallback(not_found)
        .with_state(state);

    let router = middleware::cors::apply(router, config.app_env, &config.cors_allowed_origins);
    let router = middleware::rate_limit::apply(router, limiter, config.trust_proxy_headers);
    middleware::http::apply(router, HttpLimits::default())
}
