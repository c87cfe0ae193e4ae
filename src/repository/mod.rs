//! Storage boundary for the order core.
//!
//! Writes happen inside a [`UnitOfWork`]: a single transaction that covers
//! inventory adjustments, ledger appends and customer appends. Dropping a unit
//! of work without calling [`UnitOfWork::commit`] discards everything staged in
//! it, which is what makes a cancelled or failed placement leave no trace.
//!
//! Two adapters exist: [`sea::SeaStore`] for Postgres and
//! [`memory::MemoryStore`] for tests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Customer, NewCustomer, NewOrderLine, OrderLine, OrderSales, Product},
};

pub mod memory;
pub mod sea;

pub use memory::{Fault, MemoryStore};
pub use sea::SeaStore;

#[async_trait]
pub trait InventoryRepository: Send {
    /// Fetch a product owned by `owner_id`. Inside a write unit the row stays
    /// locked until commit or rollback.
    async fn get_product(&mut self, owner_id: Uuid, product_id: Uuid) -> AppResult<Option<Product>>;

    /// Add `delta` (negative to take stock out). `ProductNotFound` when the
    /// product does not exist for this owner.
    async fn adjust_quantity(&mut self, owner_id: Uuid, product_id: Uuid, delta: i32) -> AppResult<()>;

    async fn list_products(&mut self, owner_id: Uuid) -> AppResult<Vec<Product>>;
}

#[async_trait]
pub trait OrderLedger: Send {
    /// Reserve a fresh order id for a batch of lines.
    async fn next_order_id(&mut self) -> AppResult<i64>;

    async fn append_order_line(&mut self, line: NewOrderLine) -> AppResult<OrderLine>;

    async fn list_order_lines(&mut self, owner_id: Uuid) -> AppResult<Vec<OrderLine>>;
}

#[async_trait]
pub trait CustomerDirectory: Send {
    async fn append_customer(&mut self, customer: NewCustomer) -> AppResult<Customer>;

    async fn list_customers(&mut self, owner_id: Uuid) -> AppResult<Vec<Customer>>;
}

#[async_trait]
pub trait UnitOfWork: InventoryRepository + OrderLedger + CustomerDirectory {
    /// Make every staged write durable. Calling it twice is an error.
    async fn commit(&mut self) -> AppResult<()>;
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Open a read-write unit (read committed, row locks on touched products).
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>>;

    /// Open a read-only unit for listing.
    async fn begin_read_only(&self) -> AppResult<Box<dyn UnitOfWork>>;

    /// Ledger lines grouped by order id, in the order each id was first
    /// recorded.
    async fn sales_by_order(&self, owner_id: Uuid) -> AppResult<Vec<OrderSales>>;

    async fn count_products(&self, owner_id: Uuid) -> AppResult<u64>;

    async fn count_customers(&self, owner_id: Uuid) -> AppResult<u64>;
}
