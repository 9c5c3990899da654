use async_trait::async_trait;
use tokio::sync::RwLock;

use shoplens_core::engine::Snapshot;
use shoplens_core::{Customer, Order, Product};

use crate::{RecordStore, StoreError};

/// In-memory record store for tests and demos.
#[derive(Default)]
pub struct InMemoryRecordStore {
    orders: RwLock<Vec<Order>>,
    customers: RwLock<Vec<Customer>>,
    products: RwLock<Vec<Product>>,
}

impl InMemoryRecordStore {
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            orders: RwLock::new(snapshot.orders),
            customers: RwLock::new(snapshot.customers),
            products: RwLock::new(snapshot.products),
        }
    }

    pub async fn insert_order(&self, order: Order) {
        self.orders.write().await.push(order);
    }

    pub async fn insert_customer(&self, customer: Customer) {
        self.customers.write().await.push(customer);
    }

    pub async fn insert_product(&self, product: Product) {
        self.products.write().await.push(product);
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self.orders.read().await.clone())
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, StoreError> {
        Ok(self.customers.read().await.clone())
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.products.read().await.clone())
    }
}
