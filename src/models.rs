use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A store owner. Every other record is scoped to one.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Owner {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    /// Minor currency units.
    pub price: i64,
    pub quantity: i32,
    pub image_ref: String,
    pub created_at: DateTime<Utc>,
}

/// One ledger entry. Lines sharing `order_id` form an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderLine {
    /// Position in the ledger.
    pub id: i64,
    pub order_id: i64,
    pub product_id: Uuid,
    pub owner_id: Uuid,
    pub quantity: i32,
    pub unit_price: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderLine {
    pub order_id: i64,
    pub product_id: Uuid,
    pub owner_id: Uuid,
    pub quantity: i32,
    pub unit_price: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Customer {
    pub id: Uuid,
    pub owner_id: Uuid,
    /// Order placement that created this record.
    pub order_id: i64,
    pub name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub owner_id: Uuid,
    pub order_id: i64,
    pub name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Employee {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub post: String,
    pub salary: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Outlet {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub lat: f64,
    pub lng: f64,
    pub created_at: DateTime<Utc>,
}

/// Per-order aggregate produced by the store; both valuations are computed in
/// the same pass so reporting can pick one without another round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSales {
    pub order_id: i64,
    pub product_ids: Vec<Uuid>,
    /// Sum of current product prices, once per line.
    pub list_price_total: i64,
    /// Sum of unit price at sale times quantity.
    pub sale_value_total: i64,
}
