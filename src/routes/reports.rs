use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::reports::{DashboardCounters, SalesReport},
    error::AppResult,
    middleware::auth::AuthOwner,
    response::{ApiResponse, Meta},
    services::report_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sales", get(sales_report))
        .route("/dashboard", get(dashboard))
}

#[utoipa::path(
    get,
    path = "/api/reports/sales",
    responses(
        (status = 200, description = "Sales grouped by order", body = ApiResponse<SalesReport>)
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn sales_report(
    State(state): State<AppState>,
    owner: AuthOwner,
) -> AppResult<Json<ApiResponse<SalesReport>>> {
    let report = report_service::sales_report(
        state.store.as_ref(),
        state.config.sales_valuation,
        owner.owner_id,
    )
    .await?;
    let total = report.items.len();
    Ok(Json(ApiResponse::list("Sales report", report, total)))
}

#[utoipa::path(
    get,
    path = "/api/reports/dashboard",
    responses(
        (status = 200, description = "Dashboard counters", body = ApiResponse<DashboardCounters>)
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    owner: AuthOwner,
) -> AppResult<Json<ApiResponse<DashboardCounters>>> {
    let counters = report_service::dashboard_counters(
        state.store.as_ref(),
        state.config.sales_valuation,
        owner.owner_id,
    )
    .await?;
    Ok(Json(ApiResponse::success(
        "Dashboard",
        counters,
        Some(Meta::empty()),
    )))
}
