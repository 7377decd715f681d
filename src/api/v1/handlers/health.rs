use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::v1::response::{ApiResponse, ok};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: &'static str,
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
}

/// GET /health. Always 200; a database that does not answer shows up in the body.
pub async fn health(State(state): State<AppState>) -> ApiResponse<HealthStatus> {
    let database = match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => "up",
        Err(err) => {
            tracing::warn!(error = %err, "health check: database unreachable");
            "down"
        }
    };

    ok(
        "Service is healthy",
        HealthStatus {
            status: "healthy",
            database,
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}
