//! Record-store boundary for the Shoplens analytics engine.
//!
//! The engine only ever needs full table scans of three collections, taken
//! together as one snapshot. This crate provides the trait for that
//! boundary, an in-memory implementation for tests and demos, and a SQLite
//! implementation with embedded migrations.

pub mod connection;
pub mod fixtures;
pub mod memory;
pub mod migrations;
pub mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

use shoplens_core::engine::Snapshot;
use shoplens_core::{Customer, Order, Product};

pub use connection::{connect, connect_with_settings, DbPool};
pub use fixtures::{demo_snapshot, seed, SeedSummary};
pub use memory::InMemoryRecordStore;
pub use sqlite::SqliteRecordStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Bulk-read access to the three source collections. Read failures
/// propagate to the caller; they are never mapped to empty collections.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list_orders(&self) -> Result<Vec<Order>, StoreError>;
    async fn list_customers(&self) -> Result<Vec<Customer>, StoreError>;
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;
}

/// One combined snapshot of all three collections, so every analyzer sees
/// the same point in time.
pub async fn load_snapshot<S: RecordStore + ?Sized>(store: &S) -> Result<Snapshot, StoreError> {
    Ok(Snapshot {
        orders: store.list_orders().await?,
        customers: store.list_customers().await?,
        products: store.list_products().await?,
    })
}
