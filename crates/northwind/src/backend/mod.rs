//! Raw key-value store primitives.
//!
//! [`TableBackend`] is the seam between the typed gateway and lifecycle
//! code and the remote store. [`DynamoDbBackend`] talks to DynamoDB;
//! [`InMemoryBackend`] keeps rows in process for tests.

mod dynamodb;
#[cfg(any(test, feature = "inmemory"))]
mod inmemory;

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use northwind_core::storage::{BackendError, KeyQuery};

use crate::table::TableConfig;

pub use dynamodb::{AwsConfig, DynamoDbBackend, DEFAULT_REGION};
#[cfg(any(test, feature = "inmemory"))]
pub use inmemory::InMemoryBackend;

/// One stored row.
pub type Item = HashMap<String, AttributeValue>;

/// Table status as reported by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStatus {
    Creating,
    Active,
    Updating,
    Deleting,
    Unavailable,
}

/// Status of a global secondary index.
#[derive(Debug, Clone)]
pub struct GsiState {
    pub name: String,
    pub status: TableStatus,
}

/// Current state of an existing table.
#[derive(Debug, Clone)]
pub struct TableState {
    pub status: TableStatus,
    pub gsis: Vec<GsiState>,
}

impl TableState {
    /// True once the table and every index accept traffic.
    pub fn is_ready(&self) -> bool {
        self.status == TableStatus::Active
            && self.gsis.iter().all(|g| g.status == TableStatus::Active)
    }
}

/// One page of a scan.
#[derive(Debug, Clone, Default)]
pub struct ScanPage {
    pub items: Vec<Item>,
    /// Where the next page starts; `None` when the scan is complete.
    pub last_evaluated_key: Option<Item>,
}

/// Parameters of a single scan call.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    /// Attributes to project; empty returns whole items.
    pub attributes: &'static [&'static str],
    pub limit: i32,
    pub exclusive_start_key: Option<Item>,
}

/// The store primitives used by the gateway and the table manager.
///
/// Implementations never retry; every call maps to exactly one request.
#[async_trait]
pub trait TableBackend: Send + Sync {
    /// Writes an item, replacing any item with the same primary key.
    async fn put_item(&self, table_name: &str, item: Item) -> Result<(), BackendError>;

    /// Runs a key-condition query and returns the first page of results.
    async fn query(&self, table_name: &str, query: &KeyQuery) -> Result<Vec<Item>, BackendError>;

    /// Reads one page of a table scan.
    async fn scan(&self, table_name: &str, request: ScanRequest) -> Result<ScanPage, BackendError>;

    /// Deletes items by primary key in one batch call.
    ///
    /// Returns the number of keys the store left unprocessed.
    async fn batch_delete(&self, table_name: &str, keys: Vec<Item>) -> Result<usize, BackendError>;

    /// Starts creating a table. Returns before the table is active.
    async fn create_table(&self, config: &TableConfig) -> Result<(), BackendError>;

    /// Starts deleting a table. Returns before the table is gone.
    async fn delete_table(&self, table_name: &str) -> Result<(), BackendError>;

    /// Returns the table state, or `None` if the table does not exist.
    async fn describe_table(&self, table_name: &str) -> Result<Option<TableState>, BackendError>;
}
