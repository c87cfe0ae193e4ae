use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
};
use uuid::Uuid;

use crate::{
    dto::employees::{CreateEmployeeRequest, EmployeeList},
    error::AppResult,
    middleware::auth::AuthOwner,
    models::Employee,
    response::ApiResponse,
    services::employee_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_employees).post(add_employee))
        .route("/{id}", delete(remove_employee))
}

#[utoipa::path(
    get,
    path = "/api/employees",
    responses(
        (status = 200, description = "List employees", body = ApiResponse<EmployeeList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn list_employees(
    State(state): State<AppState>,
    owner: AuthOwner,
) -> AppResult<Json<ApiResponse<EmployeeList>>> {
    let resp = employee_service::list_employees(&state, &owner).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployeeRequest,
    responses(
        (status = 201, description = "Add employee", body = ApiResponse<Employee>),
        (status = 400, description = "Invalid employee"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn add_employee(
    State(state): State<AppState>,
    owner: AuthOwner,
    Json(payload): Json<CreateEmployeeRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Employee>>)> {
    let resp = employee_service::add_employee(&state, &owner, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    params(
        ("id" = Uuid, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee removed"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn remove_employee(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = employee_service::remove_employee(&state, &owner, id).await?;
    Ok(Json(resp))
}
