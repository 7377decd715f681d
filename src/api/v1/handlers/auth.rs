/*
 * Responsibility
 * - /auth handlers: register, login, logout, refresh, me
 * - logout/me run behind the access gate, refresh behind the refresh gate
 */
use axum::extract::State;

use crate::api::v1::{
    dto::{
        Validate,
        auth::{LoginRequest, RegisterRequest, TokenResponse},
        users::UserResponse,
    },
    extractors::{CurrentPrincipal, JsonBody},
    response::{ApiResponse, created, ok},
};
use crate::error::AppError;
use crate::state::AppState;
use crate::types::UserId;

#[derive(Debug, serde::Serialize)]
pub struct Registered {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<ApiResponse<Registered>, AppError> {
    req.validate().map_err(AppError::bad_request)?;

    let user = state
        .sessions
        .register(&req.name, &req.email, &req.password)
        .await?;

    Ok(created(
        "User registered successfully",
        Registered {
            id: user.id,
            name: user.name,
            email: user.email,
        },
    ))
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<ApiResponse<TokenResponse>, AppError> {
    req.validate().map_err(AppError::bad_request)?;

    let tokens = state.sessions.login(&req.email, &req.password).await?;
    Ok(ok("Login successful", tokens.into()))
}

pub async fn logout(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<ApiResponse<()>, AppError> {
    state.sessions.logout(&principal).await?;
    Ok(ApiResponse::empty(
        axum::http::StatusCode::OK,
        "Logout successful",
    ))
}

pub async fn refresh(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<ApiResponse<TokenResponse>, AppError> {
    let tokens = state.sessions.refresh(&principal).await?;
    Ok(ok("Token refreshed", tokens.into()))
}

pub async fn me(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<ApiResponse<UserResponse>, AppError> {
    let user = state.users.get(principal.id).await?;
    Ok(ok("User retrieved", user.into()))
}
