//! Storage interfaces and implementations for persisting special orders.

mod sqlite;

pub use sqlite::{SqliteStore, SqliteStoreConfig};

use crate::domain::{Client, SpecialOrder, Supplier};
use async_trait::async_trait;

/// OrderStore defines the persistence interface the lifecycle manager and
/// the reports consume. The store is the single source of truth; callers
/// re-fetch after every mutation rather than patching local copies.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// List retrieves all special orders, newest first.
    async fn list(&self) -> Result<Vec<SpecialOrder>, StoreError>;

    /// Get retrieves one order by id.
    async fn get(&self, id: i64) -> Result<Option<SpecialOrder>, StoreError>;

    /// Insert persists a new order and returns it with its assigned id.
    async fn insert(&self, order: &SpecialOrder) -> Result<SpecialOrder, StoreError>;

    /// Update replaces the full record of an existing order in one write.
    /// Returns NotFound if no row matches the order's id.
    async fn update(&self, order: &SpecialOrder) -> Result<(), StoreError>;

    /// Delete removes an order unconditionally.
    /// Returns NotFound if no row matches.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;

    /// ListClients retrieves the client directory (read-only here).
    async fn list_clients(&self) -> Result<Vec<Client>, StoreError>;

    /// ListSuppliers retrieves the supplier directory (read-only here).
    async fn list_suppliers(&self) -> Result<Vec<Supplier>, StoreError>;

    /// Close closes the storage connection.
    async fn close(&self) -> Result<(), StoreError>;
}

/// StoreError represents errors that can occur during storage operations.
/// Database errors are the transport-failure class; callers may retry them,
/// unlike business-rule rejections.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
