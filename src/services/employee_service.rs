use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    db::with_timeout,
    dto::employees::{CreateEmployeeRequest, EmployeeList},
    entity::employees::{ActiveModel, Column, Entity as Employees, Model as EmployeeModel},
    error::{AppError, AppResult},
    middleware::auth::AuthOwner,
    models::Employee,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_employees(
    state: &AppState,
    owner: &AuthOwner,
) -> AppResult<ApiResponse<EmployeeList>> {
    let items: Vec<Employee> = with_timeout(
        state.config.db_timeout,
        Employees::find()
            .filter(Column::OwnerId.eq(owner.owner_id))
            .order_by_asc(Column::CreatedAt)
            .all(&state.orm),
    )
    .await?
    .into_iter()
    .map(employee_from_entity)
    .collect();
    let total = items.len();
    Ok(ApiResponse::list("Employees", EmployeeList { items }, total))
}

pub async fn add_employee(
    state: &AppState,
    owner: &AuthOwner,
    payload: CreateEmployeeRequest,
) -> AppResult<ApiResponse<Employee>> {
    payload.validate()?;
    let insert = ActiveModel {
        id: Set(Uuid::new_v4()),
        owner_id: Set(owner.owner_id),
        name: Set(payload.name),
        post: Set(payload.post),
        salary: Set(payload.salary),
        created_at: NotSet,
    }
    .insert(&state.orm);
    let employee = with_timeout(state.config.db_timeout, insert).await?;

    tracing::info!(owner_id = %owner.owner_id, employee_id = %employee.id, "employee added");

    Ok(ApiResponse::success(
        "Employee added",
        employee_from_entity(employee),
        Some(Meta::empty()),
    ))
}

pub async fn remove_employee(
    state: &AppState,
    owner: &AuthOwner,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = with_timeout(
        state.config.db_timeout,
        Employees::delete_many()
            .filter(
                Condition::all()
                    .add(Column::OwnerId.eq(owner.owner_id))
                    .add(Column::Id.eq(id)),
            )
            .exec(&state.orm),
    )
    .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!(owner_id = %owner.owner_id, employee_id = %id, "employee removed");

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn employee_from_entity(model: EmployeeModel) -> Employee {
    Employee {
        id: model.id,
        owner_id: model.owner_id,
        name: model.name,
        post: model.post,
        salary: model.salary,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
