use std::{
    collections::VecDeque,
    sync::{
        Arc,
        atomic::{AtomicI64, Ordering},
    },
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Customer, NewCustomer, NewOrderLine, OrderLine, OrderSales, Product},
    repository::{CustomerDirectory, InventoryRepository, OrderLedger, Store, UnitOfWork},
};

const FIRST_ORDER_ID: i64 = 1000;

/// Failure to inject into the next write unit opened on a [`MemoryStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Fail the ledger append at this zero-based position within the unit.
    LedgerAppend(usize),
    CustomerAppend,
    /// The first product lookup times out, as a contended row lock would.
    LockTimeout,
    Commit,
    /// Commit fails with a timeout, which counts as transient.
    CommitTimeout,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    products: Vec<Product>,
    order_lines: Vec<OrderLine>,
    customers: Vec<Customer>,
    next_line_id: i64,
}

/// In-process store. A unit of work holds the whole state lock until it is
/// committed or dropped, so units are serialized and stock checks can never
/// interleave.
#[derive(Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    faults: Arc<Mutex<VecDeque<Fault>>>,
    order_seq: Arc<AtomicI64>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
            faults: Arc::new(Mutex::new(VecDeque::new())),
            order_seq: Arc::new(AtomicI64::new(FIRST_ORDER_ID)),
        }
    }

    pub async fn seed_product(
        &self,
        owner_id: Uuid,
        name: &str,
        price: i64,
        quantity: i32,
    ) -> Product {
        let product = Product {
            id: Uuid::new_v4(),
            owner_id,
            name: name.to_string(),
            price,
            quantity,
            image_ref: format!("/static/img/{}.png", name.to_lowercase().replace(' ', "-")),
            created_at: Utc::now(),
        };
        self.state.lock().await.products.push(product.clone());
        product
    }

    /// Change a product's current price, as product management would.
    pub async fn set_price(&self, product_id: Uuid, price: i64) {
        let mut state = self.state.lock().await;
        if let Some(product) = state.products.iter_mut().find(|p| p.id == product_id) {
            product.price = price;
        }
    }

    pub async fn product(&self, product_id: Uuid) -> Option<Product> {
        let state = self.state.lock().await;
        state.products.iter().find(|p| p.id == product_id).cloned()
    }

    /// Queue a fault. Each write unit opened afterwards consumes one.
    pub async fn inject(&self, fault: Fault) {
        self.faults.lock().await.push_back(fault);
    }

    async fn open(&self, read_only: bool) -> MemoryUnitOfWork {
        let fault = if read_only {
            None
        } else {
            self.faults.lock().await.pop_front()
        };
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        MemoryUnitOfWork {
            guard: Some(guard),
            working,
            read_only,
            fault,
            appended_lines: 0,
            order_seq: self.order_seq.clone(),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        Ok(Box::new(self.open(false).await))
    }

    async fn begin_read_only(&self) -> AppResult<Box<dyn UnitOfWork>> {
        Ok(Box::new(self.open(true).await))
    }

    async fn sales_by_order(&self, owner_id: Uuid) -> AppResult<Vec<OrderSales>> {
        let state = self.state.lock().await;
        let mut groups: Vec<OrderSales> = Vec::new();
        for line in state.order_lines.iter().filter(|l| l.owner_id == owner_id) {
            // Inner join semantics: lines whose product is gone drop out.
            let Some(product) = state.products.iter().find(|p| p.id == line.product_id) else {
                continue;
            };
            let idx = match groups.iter().position(|g| g.order_id == line.order_id) {
                Some(idx) => idx,
                None => {
                    groups.push(OrderSales {
                        order_id: line.order_id,
                        product_ids: Vec::new(),
                        list_price_total: 0,
                        sale_value_total: 0,
                    });
                    groups.len() - 1
                }
            };
            let group = &mut groups[idx];
            group.product_ids.push(line.product_id);
            group.list_price_total = group
                .list_price_total
                .checked_add(product.price)
                .ok_or_else(|| AppError::Storage("bigint out of range".into()))?;
            group.sale_value_total = line
                .unit_price
                .checked_mul(i64::from(line.quantity))
                .and_then(|value| group.sale_value_total.checked_add(value))
                .ok_or_else(|| AppError::Storage("bigint out of range".into()))?;
        }
        Ok(groups)
    }

    async fn count_products(&self, owner_id: Uuid) -> AppResult<u64> {
        let state = self.state.lock().await;
        Ok(state.products.iter().filter(|p| p.owner_id == owner_id).count() as u64)
    }

    async fn count_customers(&self, owner_id: Uuid) -> AppResult<u64> {
        let state = self.state.lock().await;
        Ok(state.customers.iter().filter(|c| c.owner_id == owner_id).count() as u64)
    }
}

pub struct MemoryUnitOfWork {
    guard: Option<OwnedMutexGuard<MemoryState>>,
    working: MemoryState,
    read_only: bool,
    fault: Option<Fault>,
    appended_lines: usize,
    order_seq: Arc<AtomicI64>,
}

impl MemoryUnitOfWork {
    fn ensure_writable(&self) -> AppResult<()> {
        if self.guard.is_none() {
            return Err(AppError::Storage("unit of work already finished".into()));
        }
        if self.read_only {
            return Err(AppError::Storage("write in a read-only unit of work".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryRepository for MemoryUnitOfWork {
    async fn get_product(&mut self, owner_id: Uuid, product_id: Uuid) -> AppResult<Option<Product>> {
        if self.fault == Some(Fault::LockTimeout) {
            self.fault = None;
            return Err(AppError::Timeout);
        }
        Ok(self
            .working
            .products
            .iter()
            .find(|p| p.owner_id == owner_id && p.id == product_id)
            .cloned())
    }

    async fn adjust_quantity(&mut self, owner_id: Uuid, product_id: Uuid, delta: i32) -> AppResult<()> {
        self.ensure_writable()?;
        let product = self
            .working
            .products
            .iter_mut()
            .find(|p| p.owner_id == owner_id && p.id == product_id)
            .ok_or(AppError::ProductNotFound { product_id })?;
        let quantity = product
            .quantity
            .checked_add(delta)
            .filter(|q| *q >= 0)
            .ok_or_else(|| AppError::Storage("products_quantity_check violated".into()))?;
        product.quantity = quantity;
        Ok(())
    }

    async fn list_products(&mut self, owner_id: Uuid) -> AppResult<Vec<Product>> {
        Ok(self
            .working
            .products
            .iter()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl OrderLedger for MemoryUnitOfWork {
    async fn next_order_id(&mut self) -> AppResult<i64> {
        self.ensure_writable()?;
        Ok(self.order_seq.fetch_add(1, Ordering::SeqCst))
    }

    async fn append_order_line(&mut self, line: NewOrderLine) -> AppResult<OrderLine> {
        self.ensure_writable()?;
        if self.fault == Some(Fault::LedgerAppend(self.appended_lines)) {
            return Err(AppError::Storage("injected ledger failure".into()));
        }
        self.appended_lines += 1;
        self.working.next_line_id += 1;
        let line = OrderLine {
            id: self.working.next_line_id,
            order_id: line.order_id,
            product_id: line.product_id,
            owner_id: line.owner_id,
            quantity: line.quantity,
            unit_price: line.unit_price,
            created_at: Utc::now(),
        };
        self.working.order_lines.push(line.clone());
        Ok(line)
    }

    async fn list_order_lines(&mut self, owner_id: Uuid) -> AppResult<Vec<OrderLine>> {
        Ok(self
            .working
            .order_lines
            .iter()
            .filter(|l| l.owner_id == owner_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CustomerDirectory for MemoryUnitOfWork {
    async fn append_customer(&mut self, customer: NewCustomer) -> AppResult<Customer> {
        self.ensure_writable()?;
        if self.fault == Some(Fault::CustomerAppend) {
            return Err(AppError::Storage("injected customer failure".into()));
        }
        let customer = Customer {
            id: Uuid::new_v4(),
            owner_id: customer.owner_id,
            order_id: customer.order_id,
            name: customer.name,
            email: customer.email,
            address: customer.address,
            city: customer.city,
            state: customer.state,
            zip: customer.zip,
            created_at: Utc::now(),
        };
        self.working.customers.push(customer.clone());
        Ok(customer)
    }

    async fn list_customers(&mut self, owner_id: Uuid) -> AppResult<Vec<Customer>> {
        Ok(self
            .working
            .customers
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn commit(&mut self) -> AppResult<()> {
        match self.fault {
            Some(Fault::Commit) => return Err(AppError::Storage("injected commit failure".into())),
            Some(Fault::CommitTimeout) => return Err(AppError::Timeout),
            _ => {}
        }
        let mut guard = self
            .guard
            .take()
            .ok_or_else(|| AppError::Storage("unit of work already finished".into()))?;
        if !self.read_only {
            *guard = std::mem::take(&mut self.working);
        }
        Ok(())
    }
}
