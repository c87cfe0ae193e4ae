use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(Serialize, ToSchema)]
pub struct HealthData {
    pub status: String,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Process is up", body = ApiResponse<HealthData>),
    ),
    tag = "Health"
)]
pub async fn health_check() -> Json<ApiResponse<HealthData>> {
    Json(ApiResponse::success(
        "Health check",
        health_data("ok"),
        Some(Meta::empty()),
    ))
}

#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Database reachable", body = ApiResponse<HealthData>),
        (status = 503, description = "Database unreachable", body = ApiResponse<HealthData>),
    ),
    tag = "Health"
)]
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<HealthData>>) {
    let ping = tokio::time::timeout(
        state.config.db_timeout,
        sqlx::query("SELECT 1").execute(&state.pool),
    )
    .await;

    match ping {
        Ok(Ok(_)) => (
            StatusCode::OK,
            Json(ApiResponse::success("Ready", health_data("ok"), Some(Meta::empty()))),
        ),
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "readiness check failed");
            unavailable()
        }
        Err(_) => {
            tracing::warn!("readiness check timed out");
            unavailable()
        }
    }
}

fn unavailable() -> (StatusCode, Json<ApiResponse<HealthData>>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ApiResponse::success(
            "Not ready",
            health_data("unavailable"),
            Some(Meta::empty()),
        )),
    )
}

fn health_data(status: &str) -> HealthData {
    HealthData {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}
