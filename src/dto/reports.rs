use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SalesReportEntry {
    /// 1-based position of the order in the report.
    pub order_number: i64,
    pub order_id: i64,
    pub product_ids: Vec<Uuid>,
    pub total_sales: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct SalesReport {
    #[schema(value_type = Vec<SalesReportEntry>)]
    pub items: Vec<SalesReportEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DashboardCounters {
    pub product_count: u64,
    pub customer_count: u64,
    pub total_sales: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StockLevel {
    pub name: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct StockLevels {
    #[schema(value_type = Vec<StockLevel>)]
    pub items: Vec<StockLevel>,
}
