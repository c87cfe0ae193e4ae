use axum::{Json, Router, extract::State, http::StatusCode, routing::get};

use crate::{
    dto::outlets::{CreateOutletRequest, OutletList},
    error::AppResult,
    middleware::auth::AuthOwner,
    models::Outlet,
    response::ApiResponse,
    services::outlet_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_outlets).post(add_outlet))
}

#[utoipa::path(
    get,
    path = "/api/outlets",
    responses(
        (status = 200, description = "Outlet locations", body = ApiResponse<OutletList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Outlets"
)]
pub async fn list_outlets(
    State(state): State<AppState>,
    owner: AuthOwner,
) -> AppResult<Json<ApiResponse<OutletList>>> {
    let resp = outlet_service::list_outlets(&state, &owner).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/outlets",
    request_body = CreateOutletRequest,
    responses(
        (status = 201, description = "Add outlet", body = ApiResponse<Outlet>),
        (status = 400, description = "Coordinates out of range"),
    ),
    security(("bearer_auth" = [])),
    tag = "Outlets"
)]
pub async fn add_outlet(
    State(state): State<AppState>,
    owner: AuthOwner,
    Json(payload): Json<CreateOutletRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Outlet>>)> {
    let resp = outlet_service::add_outlet(&state, &owner, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
