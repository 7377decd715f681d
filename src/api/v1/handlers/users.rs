/*
 * Responsibility
 * - /users handlers
 * - the self-or-admin rule lives in UserService
 */
use axum::extract::State;

use crate::api::v1::{
    dto::users::{UpdateUserRequest, UserResponse},
    extractors::{CurrentPrincipal, JsonBody, Pagination, PathId},
    response::{ApiResponse, ok},
};
use crate::error::AppError;
use crate::state::AppState;

pub async fn list_users(
    State(state): State<AppState>,
    Pagination(page): Pagination,
) -> Result<ApiResponse<Vec<UserResponse>>, AppError> {
    let rows = state.users.list(page).await?;
    Ok(ok(
        "Users retrieved",
        rows.into_iter().map(UserResponse::from).collect(),
    ))
}

pub async fn get_user(
    State(state): State<AppState>,
    id: PathId,
) -> Result<ApiResponse<UserResponse>, AppError> {
    let row = state.users.get(id.as_user()).await?;
    Ok(ok("User retrieved", row.into()))
}

pub async fn update_user(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    id: PathId,
    JsonBody(req): JsonBody<UpdateUserRequest>,
) -> Result<ApiResponse<UserResponse>, AppError> {
    let row = state.users.update(&principal, id.as_user(), req).await?;
    Ok(ok("User updated", row.into()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    id: PathId,
) -> Result<ApiResponse<()>, AppError> {
    state.users.delete(&principal, id.as_user()).await?;
    Ok(ApiResponse::empty(axum::http::StatusCode::OK, "User deleted"))
}
