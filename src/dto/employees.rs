use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::Employee,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEmployeeRequest {
    pub name: String,
    pub post: String,
    pub salary: f64,
}

impl CreateEmployeeRequest {
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() || self.post.trim().is_empty() {
            return Err(AppError::Validation("name and post are required".into()));
        }
        if !self.salary.is_finite() || self.salary < 0.0 {
            return Err(AppError::Validation("salary must be a non-negative number".into()));
        }
        Ok(())
    }
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct EmployeeList {
    #[schema(value_type = Vec<Employee>)]
    pub items: Vec<Employee>,
}
