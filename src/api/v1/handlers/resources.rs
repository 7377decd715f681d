/*
 * Responsibility
 * - one set of CRUD handlers for every owned resource
 * - the concrete service is picked by type: State<ResourceService<R>>
 */
use axum::extract::State;
use axum::http::StatusCode;

use crate::api::v1::{
    extractors::{CurrentPrincipal, JsonBody, Pagination, PathId},
    response::{ApiResponse, created, ok},
};
use crate::error::AppError;
use crate::repos::resource::ResourceRepo;
use crate::services::resource_service::ResourceService;

pub async fn list<R: ResourceRepo>(
    State(service): State<ResourceService<R>>,
    Pagination(page): Pagination,
) -> Result<ApiResponse<Vec<R::Row>>, AppError> {
    let rows = service.list(page).await?;
    Ok(ok(format!("{} list retrieved", R::RESOURCE), rows))
}

pub async fn list_by_owner<R: ResourceRepo>(
    State(service): State<ResourceService<R>>,
    owner: PathId,
    Pagination(page): Pagination,
) -> Result<ApiResponse<Vec<R::Row>>, AppError> {
    let rows = service.list_by_owner(owner.as_user(), page).await?;
    Ok(ok(format!("{} list retrieved", R::RESOURCE), rows))
}

pub async fn get<R: ResourceRepo>(
    State(service): State<ResourceService<R>>,
    id: PathId,
) -> Result<ApiResponse<R::Row>, AppError> {
    let row = service.get(id.0).await?;
    Ok(ok(format!("{} retrieved", R::RESOURCE), row))
}

pub async fn create<R: ResourceRepo>(
    State(service): State<ResourceService<R>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    JsonBody(input): JsonBody<R::Create>,
) -> Result<ApiResponse<R::Row>, AppError> {
    let row = service.create(&principal, input).await?;
    Ok(created(format!("{} created", R::RESOURCE), row))
}

pub async fn update<R: ResourceRepo>(
    State(service): State<ResourceService<R>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    id: PathId,
    JsonBody(input): JsonBody<R::Update>,
) -> Result<ApiResponse<R::Row>, AppError> {
    let row = service.update(&principal, id.0, input).await?;
    Ok(ok(format!("{} updated", R::RESOURCE), row))
}

pub async fn delete<R: ResourceRepo>(
    State(service): State<ResourceService<R>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    id: PathId,
) -> Result<ApiResponse<()>, AppError> {
    service.delete(&principal, id.0).await?;
    Ok(ApiResponse::empty(
        StatusCode::OK,
        format!("{} deleted", R::RESOURCE),
    ))
}
