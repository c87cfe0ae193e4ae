use store_management_api::{
    dto::orders::{CustomerDetails, LineItem, PlaceOrderRequest},
    error::AppError,
    policy::{InsufficientStockPolicy, SalesValuation},
    repository::MemoryStore,
    services::{order_service, report_service},
};
use uuid::Uuid;

async fn place(store: &MemoryStore, owner_id: Uuid, items: &[(Uuid, i32)]) -> anyhow::Result<i64> {
    let request = PlaceOrderRequest {
        items: items
            .iter()
            .map(|(product_id, quantity)| LineItem {
                product_id: *product_id,
                quantity: *quantity,
            })
            .collect(),
        customer: CustomerDetails {
            name: "Grace Hopper".into(),
            email: "grace@example.com".into(),
            address: "1 Harbor Way".into(),
            city: "Arlington".into(),
            state: "VA".into(),
            zip: "22201".into(),
        },
    };
    let outcome =
        order_service::place_order(store, InsufficientStockPolicy::RejectOrder, owner_id, &request)
            .await?;
    Ok(outcome.order_id)
}

#[tokio::test]
async fn empty_ledger_reports_nothing() -> anyhow::Result<()> {
    let store = MemoryStore::new();
    let owner_id = Uuid::new_v4();

    let report = report_service::sales_report(&store, SalesValuation::ListPrice, owner_id).await?;
    assert!(report.items.is_empty());

    let counters =
        report_service::dashboard_counters(&store, SalesValuation::ListPrice, owner_id).await?;
    assert_eq!(counters.product_count, 0);
    assert_eq!(counters.customer_count, 0);
    assert_eq!(counters.total_sales, 0);
    Ok(())
}

#[tokio::test]
async fn report_groups_lines_by_order_in_first_seen_order() -> anyhow::Result<()> {
    let store = MemoryStore::new();
    let owner_id = Uuid::new_v4();
    let p1 = store.seed_product(owner_id, "P1", 10, 50).await;
    let p2 = store.seed_product(owner_id, "P2", 25, 50).await;

    let first = place(&store, owner_id, &[(p1.id, 2), (p2.id, 1)]).await?;
    let second = place(&store, owner_id, &[(p2.id, 3)]).await?;

    let report = report_service::sales_report(&store, SalesValuation::ListPrice, owner_id).await?;
    assert_eq!(report.items.len(), 2);

    assert_eq!(report.items[0].order_number, 1);
    assert_eq!(report.items[0].order_id, first);
    assert_eq!(report.items[0].product_ids, vec![p1.id, p2.id]);
    assert_eq!(report.items[0].total_sales, 35);

    assert_eq!(report.items[1].order_number, 2);
    assert_eq!(report.items[1].order_id, second);
    assert_eq!(report.items[1].product_ids, vec![p2.id]);
    assert_eq!(report.items[1].total_sales, 25);
    Ok(())
}

#[tokio::test]
async fn reports_are_idempotent() -> anyhow::Result<()> {
    let store = MemoryStore::new();
    let owner_id = Uuid::new_v4();
    let p1 = store.seed_product(owner_id, "P1", 10, 50).await;
    place(&store, owner_id, &[(p1.id, 4)]).await?;

    let first = report_service::sales_report(&store, SalesValuation::ListPrice, owner_id).await?;
    let second = report_service::sales_report(&store, SalesValuation::ListPrice, owner_id).await?;
    assert_eq!(first, second);

    let counters_a =
        report_service::dashboard_counters(&store, SalesValuation::ListPrice, owner_id).await?;
    let counters_b =
        report_service::dashboard_counters(&store, SalesValuation::ListPrice, owner_id).await?;
    assert_eq!(counters_a, counters_b);
    Ok(())
}

#[tokio::test]
async fn valuations_differ_on_quantity_and_price_changes() -> anyhow::Result<()> {
    let store = MemoryStore::new();
    let owner_id = Uuid::new_v4();
    let p1 = store.seed_product(owner_id, "P1", 10, 50).await;
    place(&store, owner_id, &[(p1.id, 3)]).await?;

    // List price counts the current price once per line.
    let list = report_service::sales_report(&store, SalesValuation::ListPrice, owner_id).await?;
    assert_eq!(list.items[0].total_sales, 10);
    let sale = report_service::sales_report(&store, SalesValuation::SaleValue, owner_id).await?;
    assert_eq!(sale.items[0].total_sales, 30);

    store.set_price(p1.id, 15).await;

    let list = report_service::sales_report(&store, SalesValuation::ListPrice, owner_id).await?;
    assert_eq!(list.items[0].total_sales, 15);
    let sale = report_service::sales_report(&store, SalesValuation::SaleValue, owner_id).await?;
    assert_eq!(sale.items[0].total_sales, 30);
    Ok(())
}

#[tokio::test]
async fn dashboard_total_matches_report_sum() -> anyhow::Result<()> {
    let store = MemoryStore::new();
    let owner_id = Uuid::new_v4();
    let p1 = store.seed_product(owner_id, "P1", 10, 50).await;
    let p2 = store.seed_product(owner_id, "P2", 7, 50).await;
    store.seed_product(owner_id, "Unsold", 99, 1).await;

    place(&store, owner_id, &[(p1.id, 1)]).await?;
    place(&store, owner_id, &[(p1.id, 2), (p2.id, 5)]).await?;
    place(&store, owner_id, &[(p2.id, 1)]).await?;

    for valuation in [SalesValuation::ListPrice, SalesValuation::SaleValue] {
        let report = report_service::sales_report(&store, valuation, owner_id).await?;
        let counters = report_service::dashboard_counters(&store, valuation, owner_id).await?;
        let sum: i64 = report.items.iter().map(|e| e.total_sales).sum();
        assert_eq!(counters.total_sales, sum, "{valuation:?}");
        assert_eq!(counters.product_count, 3);
        assert_eq!(counters.customer_count, 3);
    }
    Ok(())
}

#[tokio::test]
async fn owners_only_see_their_own_sales() -> anyhow::Result<()> {
    let store = MemoryStore::new();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let a1 = store.seed_product(alice, "A1", 10, 10).await;
    let b1 = store.seed_product(bob, "B1", 40, 10).await;

    place(&store, alice, &[(a1.id, 1)]).await?;
    place(&store, bob, &[(b1.id, 2)]).await?;

    let report = report_service::sales_report(&store, SalesValuation::ListPrice, alice).await?;
    assert_eq!(report.items.len(), 1);
    assert_eq!(report.items[0].product_ids, vec![a1.id]);

    let counters = report_service::dashboard_counters(&store, SalesValuation::ListPrice, bob).await?;
    assert_eq!(counters.product_count, 1);
    assert_eq!(counters.customer_count, 1);
    assert_eq!(counters.total_sales, 40);
    Ok(())
}

#[tokio::test]
async fn overflowing_totals_are_storage_errors() -> anyhow::Result<()> {
    let store = MemoryStore::new();
    let owner_id = Uuid::new_v4();
    let pricey = store.seed_product(owner_id, "Pricey", i64::MAX / 2, 10).await;
    place(&store, owner_id, &[(pricey.id, 3)]).await?;

    // Both totals come from one aggregation, so either valuation fails.
    for valuation in [SalesValuation::ListPrice, SalesValuation::SaleValue] {
        let err = report_service::sales_report(&store, valuation, owner_id)
            .await
            .expect_err("price times quantity overflows");
        assert!(matches!(err, AppError::Storage(_)), "{valuation:?}");
    }
    Ok(())
}
