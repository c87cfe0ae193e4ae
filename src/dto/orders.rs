use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Customer, OrderLine},
};

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct LineItem {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl CustomerDetails {
    /// Checks done by the HTTP layer before a placement is attempted.
    pub fn validate(&self) -> AppResult<()> {
        let required = [
            ("name", &self.name),
            ("email", &self.email),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("zip", &self.zip),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(AppError::Validation(format!("customer {field} is required")));
        }
        if !self.email.contains('@') {
            return Err(AppError::Validation("customer email is invalid".into()));
        }
        if !self.zip.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == ' ') {
            return Err(AppError::Validation("customer zip is invalid".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct PlaceOrderRequest {
    pub items: Vec<LineItem>,
    pub customer: CustomerDetails,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlacementStatus {
    Accepted,
    AcceptedWithStockWarning,
}

/// A line that was only fulfilled by auto-replenishing the product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StockWarning {
    pub product_id: Uuid,
    pub requested: i32,
    pub available: i32,
    pub replenished: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlacementOutcome {
    pub status: PlacementStatus,
    pub order_id: i64,
    pub lines: Vec<OrderLine>,
    pub customer: Customer,
    pub warnings: Vec<StockWarning>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CustomerList {
    #[schema(value_type = Vec<Customer>)]
    pub items: Vec<Customer>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderLineList {
    #[schema(value_type = Vec<OrderLine>)]
    pub items: Vec<OrderLine>,
}
