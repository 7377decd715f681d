/*
 * Responsibility
 * - the JSON envelope every endpoint answers with: {status, message, data, error}
 * - success and failure share one shape so clients parse a single type
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: u16,
    pub message: String,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(status: StatusCode, message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
            data: None,
            error: Some(error.into()),
        }
    }
}

impl ApiResponse<()> {
    /// Success without a payload (`data: null`).
    pub fn empty(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
            data: None,
            error: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

pub fn ok<T: Serialize>(message: impl Into<String>, data: T) -> ApiResponse<T> {
    ApiResponse::success(StatusCode::OK, message, data)
}

pub fn created<T: Serialize>(message: impl Into<String>, data: T) -> ApiResponse<T> {
    ApiResponse::success(StatusCode::CREATED, message, data)
}
