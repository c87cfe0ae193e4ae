use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    db::with_timeout,
    dto::outlets::{CreateOutletRequest, OutletList},
    entity::outlets::{ActiveModel, Column, Entity as Outlets, Model as OutletModel},
    error::AppResult,
    middleware::auth::AuthOwner,
    models::Outlet,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_outlets(
    state: &AppState,
    owner: &AuthOwner,
) -> AppResult<ApiResponse<OutletList>> {
    let items: Vec<Outlet> = with_timeout(
        state.config.db_timeout,
        Outlets::find()
            .filter(Column::OwnerId.eq(owner.owner_id))
            .order_by_asc(Column::CreatedAt)
            .all(&state.orm),
    )
    .await?
    .into_iter()
    .map(outlet_from_entity)
    .collect();
    let total = items.len();
    Ok(ApiResponse::list("Outlets", OutletList { items }, total))
}

pub async fn add_outlet(
    state: &AppState,
    owner: &AuthOwner,
    payload: CreateOutletRequest,
) -> AppResult<ApiResponse<Outlet>> {
    payload.validate()?;
    let insert = ActiveModel {
        id: Set(Uuid::new_v4()),
        owner_id: Set(owner.owner_id),
        lat: Set(payload.lat),
        lng: Set(payload.lng),
        created_at: NotSet,
    }
    .insert(&state.orm);
    let outlet = with_timeout(state.config.db_timeout, insert).await?;

    tracing::info!(owner_id = %owner.owner_id, outlet_id = %outlet.id, "outlet added");

    Ok(ApiResponse::success(
        "Outlet added",
        outlet_from_entity(outlet),
        Some(Meta::empty()),
    ))
}

fn outlet_from_entity(model: OutletModel) -> Outlet {
    Outlet {
        id: model.id,
        owner_id: model.owner_id,
        lat: model.lat,
        lng: model.lng,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
