/*
 * Responsibility
 * - application-wide AppError
 * - IntoResponse (HTTP status + JSON envelope)
 * - unified conversion from repo / auth / ownership errors
 */
use std::time::Duration;

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::v1::response::ApiResponse;
use crate::repos::error::RepoError;
use crate::services::auth::gate::AuthFailure;
use crate::services::ownership::Forbidden;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    // The failure kind is kept for logs; it never reaches the client.
    #[error("unauthorized: {0}")]
    Unauthorized(AuthFailure),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("forbidden")]
    Forbidden,
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
    #[error("{0}")]
    Conflict(String),
    #[error("rate limited")]
    RateLimited { retry_after: Duration },
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (message, error) = match &self {
            AppError::BadRequest(detail) => ("Invalid request".to_string(), detail.clone()),
            AppError::Unauthorized(_) => (
                "Authentication failed".to_string(),
                "Invalid or missing credentials".to_string(),
            ),
            AppError::InvalidCredentials => (
                "Invalid credentials".to_string(),
                "Email or password is incorrect".to_string(),
            ),
            AppError::Forbidden => (
                "Access denied".to_string(),
                "You can only modify your own resources".to_string(),
            ),
            AppError::NotFound { resource } => (
                format!("{resource} not found"),
                format!("{resource} does not exist"),
            ),
            AppError::Conflict(detail) => ("Conflict".to_string(), detail.clone()),
            AppError::RateLimited { .. } => (
                "Rate limit exceeded".to_string(),
                "Too many requests. Please try again later.".to_string(),
            ),
            AppError::Internal => (
                "Internal server error".to_string(),
                "internal server error".to_string(),
            ),
        };

        let body = ApiResponse::<()>::failure(status, message, error);
        let mut response = (status, Json(body)).into_response();

        if let AppError::RateLimited { retry_after } = self {
            // whole seconds, at least 1
            let secs = retry_after.as_secs_f64().ceil().max(1.0) as u64;
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict => AppError::Conflict("resource already exists".to_string()),
            RepoError::MissingParent(parent) => AppError::BadRequest(format!("{parent} not found")),
            RepoError::Db(err) => {
                tracing::error!(error = %err, "database error");
                AppError::Internal
            }
        }
    }
}

impl From<AuthFailure> for AppError {
    fn from(e: AuthFailure) -> Self {
        AppError::Unauthorized(e)
    }
}

impl From<Forbidden> for AppError {
    fn from(e: Forbidden) -> Self {
        tracing::warn!(owner = %e.owner, acting = %e.acting, "ownership check failed");
        AppError::Forbidden
    }
}
