use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, Set, SqlErr};
use uuid::Uuid;

use crate::{
    db::with_timeout,
    dto::{
        products::{CreateProductRequest, ProductList, RestockRequest},
        reports::{StockLevel, StockLevels},
    },
    entity::products::{ActiveModel, Column, Entity as Products},
    error::{AppError, AppResult},
    middleware::auth::AuthOwner,
    models::Product,
    repository::{Store, sea::product_from_entity},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_products(
    store: &dyn Store,
    owner: &AuthOwner,
) -> AppResult<ApiResponse<ProductList>> {
    let mut uow = store.begin_read_only().await?;
    let items = uow.list_products(owner.owner_id).await?;
    let total = items.len();
    Ok(ApiResponse::list("Products", ProductList { items }, total))
}

pub async fn get_product(
    store: &dyn Store,
    owner: &AuthOwner,
    id: Uuid,
) -> AppResult<ApiResponse<Product>> {
    let mut uow = store.begin_read_only().await?;
    let product = match uow.get_product(owner.owner_id, id).await? {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Product", product, None))
}

pub async fn create_product(
    state: &AppState,
    owner: &AuthOwner,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    payload.validate()?;
    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        owner_id: Set(owner.owner_id),
        name: Set(payload.name),
        price: Set(payload.price),
        quantity: Set(payload.quantity),
        image_ref: Set(payload.image_ref),
        created_at: NotSet,
    };
    let product = with_timeout(state.config.db_timeout, active.insert(&state.orm)).await?;

    tracing::info!(owner_id = %owner.owner_id, product_id = %product.id, "product created");

    Ok(ApiResponse::success(
        "Product created",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    owner: &AuthOwner,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let delete = Products::delete_many()
        .filter(
            Condition::all()
                .add(Column::OwnerId.eq(owner.owner_id))
                .add(Column::Id.eq(id)),
        )
        .exec(&state.orm);
    let result = with_timeout(state.config.db_timeout, async {
        delete.await.map_err(|err| match err.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                AppError::Conflict("product has recorded sales".into())
            }
            _ => AppError::OrmError(err),
        })
    })
    .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!(owner_id = %owner.owner_id, product_id = %id, "product deleted");

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Restock (or write off) a product in its own unit of work.
pub async fn restock_product(
    store: &dyn Store,
    owner: &AuthOwner,
    id: Uuid,
    payload: RestockRequest,
) -> AppResult<ApiResponse<Product>> {
    if payload.delta == 0 {
        return Err(AppError::Validation("delta must not be 0".into()));
    }

    let mut uow = store.begin().await?;
    let product = match uow.get_product(owner.owner_id, id).await? {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let new_quantity = product
        .quantity
        .checked_add(payload.delta)
        .filter(|q| *q >= 0)
        .ok_or_else(|| AppError::Validation("quantity cannot be negative".into()))?;

    uow.adjust_quantity(owner.owner_id, id, payload.delta).await?;
    uow.commit().await.map_err(AppError::after_commit)?;

    tracing::info!(
        owner_id = %owner.owner_id,
        product_id = %id,
        delta = payload.delta,
        quantity = new_quantity,
        "product restocked"
    );

    Ok(ApiResponse::success(
        "Inventory updated",
        Product {
            quantity: new_quantity,
            ..product
        },
        Some(Meta::empty()),
    ))
}

/// Names and quantities on hand, in product creation order.
pub async fn stock_levels(
    store: &dyn Store,
    owner: &AuthOwner,
) -> AppResult<ApiResponse<StockLevels>> {
    let mut uow = store.begin_read_only().await?;
    let items: Vec<StockLevel> = uow
        .list_products(owner.owner_id)
        .await?
        .into_iter()
        .map(|p| StockLevel {
            name: p.name,
            quantity: p.quantity,
        })
        .collect();
    let total = items.len();
    Ok(ApiResponse::list("Stock levels", StockLevels { items }, total))
}
