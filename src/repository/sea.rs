use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    AccessMode, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseTransaction,
    EntityTrait, IsolationLevel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    Statement, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    db::{DbPool, OrmConn, with_timeout},
    entity::{
        customers::{ActiveModel as CustomerActive, Column as CustomerCol, Entity as Customers, Model as CustomerModel},
        order_lines::{ActiveModel as OrderLineActive, Column as OrderLineCol, Entity as OrderLines, Model as OrderLineModel},
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    models::{Customer, NewCustomer, NewOrderLine, OrderLine, OrderSales, Product},
    repository::{CustomerDirectory, InventoryRepository, OrderLedger, Store, UnitOfWork},
};

const SALES_BY_ORDER_SQL: &str = r#"
    SELECT ol.order_id,
           array_agg(ol.product_id ORDER BY ol.id) AS product_ids,
           COALESCE(SUM(p.price), 0)::BIGINT AS list_price_total,
           COALESCE(SUM(ol.unit_price * ol.quantity), 0)::BIGINT AS sale_value_total
    FROM order_lines ol
    JOIN products p ON p.id = ol.product_id
    WHERE ol.owner_id = $1
    GROUP BY ol.order_id
    ORDER BY MIN(ol.id)
"#;

/// Postgres-backed store. Writes go through SeaORM transactions, the sales
/// aggregation is a single raw query on the shared pool.
#[derive(Clone)]
pub struct SeaStore {
    orm: OrmConn,
    pool: DbPool,
    timeout: Duration,
}

impl SeaStore {
    pub fn new(orm: OrmConn, pool: DbPool, timeout: Duration) -> Self {
        Self { orm, pool, timeout }
    }

    async fn open(&self, read_only: bool) -> AppResult<Box<dyn UnitOfWork>> {
        let access_mode = read_only.then_some(AccessMode::ReadOnly);
        let txn = with_timeout(
            self.timeout,
            self.orm
                .begin_with_config(Some(IsolationLevel::ReadCommitted), access_mode),
        )
        .await?;
        Ok(Box::new(SeaUnitOfWork {
            txn: Some(txn),
            timeout: self.timeout,
            read_only,
        }))
    }
}

#[derive(Debug, FromRow)]
struct OrderSalesRow {
    order_id: i64,
    product_ids: Vec<Uuid>,
    list_price_total: i64,
    sale_value_total: i64,
}

#[async_trait]
impl Store for SeaStore {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        self.open(false).await
    }

    async fn begin_read_only(&self) -> AppResult<Box<dyn UnitOfWork>> {
        self.open(true).await
    }

    async fn sales_by_order(&self, owner_id: Uuid) -> AppResult<Vec<OrderSales>> {
        let rows = with_timeout(
            self.timeout,
            sqlx::query_as::<_, OrderSalesRow>(SALES_BY_ORDER_SQL)
                .bind(owner_id)
                .fetch_all(&self.pool),
        )
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| OrderSales {
                order_id: row.order_id,
                product_ids: row.product_ids,
                list_price_total: row.list_price_total,
                sale_value_total: row.sale_value_total,
            })
            .collect())
    }

    async fn count_products(&self, owner_id: Uuid) -> AppResult<u64> {
        with_timeout(
            self.timeout,
            Products::find()
                .filter(ProdCol::OwnerId.eq(owner_id))
                .count(&self.orm),
        )
        .await
    }

    async fn count_customers(&self, owner_id: Uuid) -> AppResult<u64> {
        with_timeout(
            self.timeout,
            Customers::find()
                .filter(CustomerCol::OwnerId.eq(owner_id))
                .count(&self.orm),
        )
        .await
    }
}

/// One database transaction. Dropping it unfinished rolls it back.
pub struct SeaUnitOfWork {
    txn: Option<DatabaseTransaction>,
    timeout: Duration,
    read_only: bool,
}

impl SeaUnitOfWork {
    fn txn(&self) -> AppResult<&DatabaseTransaction> {
        self.txn
            .as_ref()
            .ok_or_else(|| AppError::Storage("unit of work already finished".into()))
    }
}

#[async_trait]
impl InventoryRepository for SeaUnitOfWork {
    async fn get_product(&mut self, owner_id: Uuid, product_id: Uuid) -> AppResult<Option<Product>> {
        let txn = self.txn()?;
        let mut finder = Products::find().filter(
            Condition::all()
                .add(ProdCol::OwnerId.eq(owner_id))
                .add(ProdCol::Id.eq(product_id)),
        );
        if !self.read_only {
            finder = finder.lock(LockType::Update);
        }
        let product = with_timeout(self.timeout, finder.one(txn)).await?;
        Ok(product.map(product_from_entity))
    }

    async fn adjust_quantity(&mut self, owner_id: Uuid, product_id: Uuid, delta: i32) -> AppResult<()> {
        let txn = self.txn()?;
        let result = with_timeout(
            self.timeout,
            Products::update_many()
                .col_expr(ProdCol::Quantity, Expr::col(ProdCol::Quantity).add(delta))
                .filter(ProdCol::OwnerId.eq(owner_id))
                .filter(ProdCol::Id.eq(product_id))
                .exec(txn),
        )
        .await?;

        if result.rows_affected == 0 {
            return Err(AppError::ProductNotFound { product_id });
        }
        Ok(())
    }

    async fn list_products(&mut self, owner_id: Uuid) -> AppResult<Vec<Product>> {
        let txn = self.txn()?;
        let products = with_timeout(
            self.timeout,
            Products::find()
                .filter(ProdCol::OwnerId.eq(owner_id))
                .order_by_asc(ProdCol::CreatedAt)
                .all(txn),
        )
        .await?;
        Ok(products.into_iter().map(product_from_entity).collect())
    }
}

#[async_trait]
impl OrderLedger for SeaUnitOfWork {
    async fn next_order_id(&mut self) -> AppResult<i64> {
        let txn = self.txn()?;
        let backend = txn.get_database_backend();
        let row = with_timeout(
            self.timeout,
            txn.query_one(Statement::from_string(
                backend,
                "SELECT nextval('order_id_seq') AS order_id".to_owned(),
            )),
        )
        .await?
        .ok_or_else(|| AppError::Storage("order id sequence returned no row".into()))?;
        Ok(row.try_get::<i64>("", "order_id")?)
    }

    async fn append_order_line(&mut self, line: NewOrderLine) -> AppResult<OrderLine> {
        let txn = self.txn()?;
        let model = with_timeout(
            self.timeout,
            OrderLineActive {
                id: NotSet,
                order_id: Set(line.order_id),
                product_id: Set(line.product_id),
                owner_id: Set(line.owner_id),
                quantity: Set(line.quantity),
                unit_price: Set(line.unit_price),
                created_at: NotSet,
            }
            .insert(txn),
        )
        .await?;
        Ok(order_line_from_entity(model))
    }

    async fn list_order_lines(&mut self, owner_id: Uuid) -> AppResult<Vec<OrderLine>> {
        let txn = self.txn()?;
        let lines = with_timeout(
            self.timeout,
            OrderLines::find()
                .filter(OrderLineCol::OwnerId.eq(owner_id))
                .order_by_asc(OrderLineCol::Id)
                .all(txn),
        )
        .await?;
        Ok(lines.into_iter().map(order_line_from_entity).collect())
    }
}

#[async_trait]
impl CustomerDirectory for SeaUnitOfWork {
    async fn append_customer(&mut self, customer: NewCustomer) -> AppResult<Customer> {
        let txn = self.txn()?;
        let model = with_timeout(
            self.timeout,
            CustomerActive {
                id: Set(Uuid::new_v4()),
                owner_id: Set(customer.owner_id),
                order_id: Set(customer.order_id),
                name: Set(customer.name),
                email: Set(customer.email),
                address: Set(customer.address),
                city: Set(customer.city),
                state: Set(customer.state),
                zip: Set(customer.zip),
                created_at: NotSet,
            }
            .insert(txn),
        )
        .await?;
        Ok(customer_from_entity(model))
    }

    async fn list_customers(&mut self, owner_id: Uuid) -> AppResult<Vec<Customer>> {
        let txn = self.txn()?;
        let customers = with_timeout(
            self.timeout,
            Customers::find()
                .filter(CustomerCol::OwnerId.eq(owner_id))
                .order_by_asc(CustomerCol::CreatedAt)
                .all(txn),
        )
        .await?;
        Ok(customers.into_iter().map(customer_from_entity).collect())
    }
}

#[async_trait]
impl UnitOfWork for SeaUnitOfWork {
    async fn commit(&mut self) -> AppResult<()> {
        let txn = self
            .txn
            .take()
            .ok_or_else(|| AppError::Storage("unit of work already finished".into()))?;
        with_timeout(self.timeout, txn.commit()).await
    }
}

pub(crate) fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        owner_id: model.owner_id,
        name: model.name,
        price: model.price,
        quantity: model.quantity,
        image_ref: model.image_ref,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn order_line_from_entity(model: OrderLineModel) -> OrderLine {
    OrderLine {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        owner_id: model.owner_id,
        quantity: model.quantity,
        unit_price: model.unit_price,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn customer_from_entity(model: CustomerModel) -> Customer {
    Customer {
        id: model.id,
        owner_id: model.owner_id,
        order_id: model.order_id,
        name: model.name,
        email: model.email,
        address: model.address,
        city: model.city,
        state: model.state,
        zip: model.zip,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
