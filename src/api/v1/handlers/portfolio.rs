use axum::extract::State;

use crate::api::v1::{
    dto::portfolio::{PortfolioResponse, PortfolioSummary},
    extractors::{Pagination, PathId},
    response::{ApiResponse, ok},
};
use crate::error::AppError;
use crate::state::AppState;

pub async fn list_portfolios(
    State(state): State<AppState>,
    Pagination(page): Pagination,
) -> Result<ApiResponse<Vec<PortfolioSummary>>, AppError> {
    let summaries = state.portfolio.summaries(page).await?;
    Ok(ok("Portfolios retrieved", summaries))
}

pub async fn get_portfolio(
    State(state): State<AppState>,
    user_id: PathId,
) -> Result<ApiResponse<PortfolioResponse>, AppError> {
    let portfolio = state.portfolio.for_user(user_id.as_user()).await?;
    Ok(ok("Portfolio retrieved", portfolio))
}
