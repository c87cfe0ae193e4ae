use uuid::Uuid;

use crate::{
    dto::orders::{
        CustomerList, LineItem, OrderLineList, PlaceOrderRequest, PlacementOutcome,
        PlacementStatus, StockWarning,
    },
    error::{AppError, AppResult},
    models::{NewCustomer, NewOrderLine, Product},
    policy::{InsufficientStockPolicy, PlacementPolicy, REPLENISH_UNITS},
    repository::Store,
    response::ApiResponse,
};

/// Place an order as one unit of work: stock adjustments, ledger lines and
/// the customer record commit together or not at all.
pub async fn place_order(
    store: &dyn Store,
    stock_policy: InsufficientStockPolicy,
    owner_id: Uuid,
    request: &PlaceOrderRequest,
) -> AppResult<PlacementOutcome> {
    validate_line_items(&request.items)?;

    let mut uow = store.begin().await?;
    let order_id = uow.next_order_id().await?;

    let mut lines = Vec::with_capacity(request.items.len());
    let mut warnings = Vec::new();

    for item in &request.items {
        let product = uow
            .get_product(owner_id, item.product_id)
            .await?
            .ok_or(AppError::ProductNotFound {
                product_id: item.product_id,
            })?;

        let change = plan_stock_change(stock_policy, &product, item.quantity)?;
        if let Some(warning) = change.warning {
            warnings.push(warning);
        }
        uow.adjust_quantity(owner_id, product.id, change.delta).await?;

        let line = uow
            .append_order_line(NewOrderLine {
                order_id,
                product_id: product.id,
                owner_id,
                quantity: item.quantity,
                unit_price: product.price,
            })
            .await?;
        lines.push(line);
    }

    let details = &request.customer;
    let customer = uow
        .append_customer(NewCustomer {
            owner_id,
            order_id,
            name: details.name.clone(),
            email: details.email.clone(),
            address: details.address.clone(),
            city: details.city.clone(),
            state: details.state.clone(),
            zip: details.zip.clone(),
        })
        .await?;

    uow.commit().await.map_err(AppError::after_commit)?;

    let status = if warnings.is_empty() {
        PlacementStatus::Accepted
    } else {
        PlacementStatus::AcceptedWithStockWarning
    };

    tracing::info!(
        owner_id = %owner_id,
        order_id,
        lines = lines.len(),
        warnings = warnings.len(),
        "order placed"
    );

    Ok(PlacementOutcome {
        status,
        order_id,
        lines,
        customer,
        warnings,
    })
}

/// [`place_order`] with bounded retries for transient storage failures raised
/// before the commit was sent. Validation, missing products, stock rejections
/// and commits with an unknown outcome are returned at once.
pub async fn place_order_with_retry(
    store: &dyn Store,
    policy: &PlacementPolicy,
    owner_id: Uuid,
    request: &PlaceOrderRequest,
) -> AppResult<PlacementOutcome> {
    let mut attempt = 1;
    loop {
        match place_order(store, policy.insufficient_stock, owner_id, request).await {
            Err(err) if err.is_transient() && attempt < policy.max_attempts => {
                let delay = policy.backoff_for(attempt);
                tracing::warn!(
                    owner_id = %owner_id,
                    attempt,
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "order placement failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                tracing::warn!(owner_id = %owner_id, attempt, error = %err, "order placement failed");
                return Err(err);
            }
            Ok(outcome) => return Ok(outcome),
        }
    }
}

pub async fn list_customers(store: &dyn Store, owner_id: Uuid) -> AppResult<ApiResponse<CustomerList>> {
    let mut uow = store.begin_read_only().await?;
    let items = uow.list_customers(owner_id).await?;
    let total = items.len();
    Ok(ApiResponse::list("Customers", CustomerList { items }, total))
}

pub async fn list_order_lines(
    store: &dyn Store,
    owner_id: Uuid,
) -> AppResult<ApiResponse<OrderLineList>> {
    let mut uow = store.begin_read_only().await?;
    let items = uow.list_order_lines(owner_id).await?;
    let total = items.len();
    Ok(ApiResponse::list("Order lines", OrderLineList { items }, total))
}

fn validate_line_items(items: &[LineItem]) -> AppResult<()> {
    if items.is_empty() {
        return Err(AppError::Validation("order has no line items".into()));
    }
    if let Some(item) = items.iter().find(|item| item.quantity <= 0) {
        return Err(AppError::Validation(format!(
            "quantity for product {} must be greater than 0",
            item.product_id
        )));
    }
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
struct StockChange {
    delta: i32,
    warning: Option<StockWarning>,
}

fn plan_stock_change(
    policy: InsufficientStockPolicy,
    product: &Product,
    requested: i32,
) -> AppResult<StockChange> {
    if product.quantity >= requested {
        return Ok(StockChange {
            delta: -requested,
            warning: None,
        });
    }

    let insufficient = || AppError::InsufficientStock {
        product_id: product.id,
        requested,
        available: product.quantity,
    };

    match policy {
        InsufficientStockPolicy::RejectOrder => Err(insufficient()),
        InsufficientStockPolicy::AutoReplenishAndWarn => {
            // Replenishment must still cover the sale, quantity never goes negative.
            if product.quantity.saturating_add(REPLENISH_UNITS) < requested {
                return Err(insufficient());
            }
            Ok(StockChange {
                delta: REPLENISH_UNITS - requested,
                warning: Some(StockWarning {
                    product_id: product.id,
                    requested,
                    available: product.quantity,
                    replenished: REPLENISH_UNITS,
                }),
            })
        }
    }
}
