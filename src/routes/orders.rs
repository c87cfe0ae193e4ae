use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::orders::{CustomerList, OrderLineList, PlaceOrderRequest, PlacementOutcome, PlacementStatus},
    error::AppResult,
    middleware::auth::AuthOwner,
    response::{ApiResponse, Meta},
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(place_order))
        .route("/lines", get(list_order_lines))
}

pub fn customer_router() -> Router<AppState> {
    Router::new().route("/", get(list_customers))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order accepted, possibly with a stock warning", body = ApiResponse<PlacementOutcome>),
        (status = 400, description = "Invalid line items or customer details"),
        (status = 404, description = "Unknown product"),
        (status = 409, description = "Insufficient stock"),
        (status = 503, description = "Storage timed out"),
        (status = 504, description = "Commit sent but its outcome is unknown"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn place_order(
    State(state): State<AppState>,
    owner: AuthOwner,
    Json(payload): Json<PlaceOrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<PlacementOutcome>>)> {
    payload.customer.validate()?;
    let policy = state.config.placement_policy();
    let outcome = order_service::place_order_with_retry(
        state.store.as_ref(),
        &policy,
        owner.owner_id,
        &payload,
    )
    .await?;

    let message = match outcome.status {
        PlacementStatus::Accepted => "Order placed",
        PlacementStatus::AcceptedWithStockWarning => "Order placed with low stock warning",
    };
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(message, outcome, Some(Meta::empty()))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/orders/lines",
    responses(
        (status = 200, description = "Ledger lines for the owner", body = ApiResponse<OrderLineList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_order_lines(
    State(state): State<AppState>,
    owner: AuthOwner,
) -> AppResult<Json<ApiResponse<OrderLineList>>> {
    let resp = order_service::list_order_lines(state.store.as_ref(), owner.owner_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/customers",
    responses(
        (status = 200, description = "Customers recorded by order placements", body = ApiResponse<CustomerList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_customers(
    State(state): State<AppState>,
    owner: AuthOwner,
) -> AppResult<Json<ApiResponse<CustomerList>>> {
    let resp = order_service::list_customers(state.store.as_ref(), owner.owner_id).await?;
    Ok(Json(resp))
}
