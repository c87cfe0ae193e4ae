use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::{
        products::{CreateProductRequest, ProductList, RestockRequest},
        reports::StockLevels,
    },
    error::AppResult,
    middleware::auth::AuthOwner,
    models::Product,
    response::ApiResponse,
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/stock", get(stock_levels))
        .route("/{id}", get(get_product).delete(delete_product))
        .route("/{id}/stock", patch(restock_product))
}

#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "List the owner's products", body = ApiResponse<ProductList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    owner: AuthOwner,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_products(state.store.as_ref(), &owner).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Get product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::get_product(state.store.as_ref(), &owner, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Create product", body = ApiResponse<Product>),
        (status = 400, description = "Invalid product"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    owner: AuthOwner,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Product>>)> {
    let resp = product_service::create_product(&state, &owner, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Deleted product"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Product has recorded sales"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = product_service::delete_product(&state, &owner, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/products/{id}/stock",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = RestockRequest,
    responses(
        (status = 200, description = "Adjust stock on hand", body = ApiResponse<Product>),
        (status = 400, description = "Invalid adjustment"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn restock_product(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(id): Path<Uuid>,
    Json(payload): Json<RestockRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::restock_product(state.store.as_ref(), &owner, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/stock",
    responses(
        (status = 200, description = "Product names with quantities on hand", body = ApiResponse<StockLevels>)
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn stock_levels(
    State(state): State<AppState>,
    owner: AuthOwner,
) -> AppResult<Json<ApiResponse<StockLevels>>> {
    let resp = product_service::stock_levels(state.store.as_ref(), &owner).await?;
    Ok(Json(resp))
}
