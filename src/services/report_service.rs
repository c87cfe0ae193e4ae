use uuid::Uuid;

use crate::{
    dto::reports::{DashboardCounters, SalesReport, SalesReportEntry},
    error::AppResult,
    models::OrderSales,
    policy::SalesValuation,
    repository::Store,
};

pub async fn sales_report(
    store: &dyn Store,
    valuation: SalesValuation,
    owner_id: Uuid,
) -> AppResult<SalesReport> {
    let groups = store.sales_by_order(owner_id).await?;
    let items = groups
        .into_iter()
        .zip(1_i64..)
        .map(|(group, order_number)| SalesReportEntry {
            order_number,
            order_id: group.order_id,
            total_sales: order_total(valuation, &group),
            product_ids: group.product_ids,
        })
        .collect();
    Ok(SalesReport { items })
}

/// Dashboard cards. `total_sales` always equals the sum of the sales report.
pub async fn dashboard_counters(
    store: &dyn Store,
    valuation: SalesValuation,
    owner_id: Uuid,
) -> AppResult<DashboardCounters> {
    let product_count = store.count_products(owner_id).await?;
    let customer_count = store.count_customers(owner_id).await?;
    let total_sales = store
        .sales_by_order(owner_id)
        .await?
        .iter()
        .map(|group| order_total(valuation, group))
        .sum();

    Ok(DashboardCounters {
        product_count,
        customer_count,
        total_sales,
    })
}

fn order_total(valuation: SalesValuation, group: &OrderSales) -> i64 {
    match valuation {
        SalesValuation::ListPrice => group.list_price_total,
        SalesValuation::SaleValue => group.sale_value_total,
    }
}
