//! In-memory table backend.
//!
//! Mimics the DynamoDB behavior the gateway and the table manager depend
//! on: primary-key overwrite, sparse secondary indexes, paged scans that
//! hand out a continuation key whenever a page is full, and table status
//! transitions that need more than one describe call to settle.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Bound;
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use northwind_core::keys::{PK_ATTRIBUTE, SK_ATTRIBUTE};
use northwind_core::storage::{BackendError, KeyQuery};
use tokio::sync::RwLock;

use crate::backend::{
    GsiState, Item, ScanPage, ScanRequest, TableBackend, TableState, TableStatus,
};
use crate::table::TableConfig;

/// Maximum number of requests in one BatchWriteItem call.
const MAX_BATCH_SIZE: usize = 25;

type RowKey = (String, String);

#[derive(Debug)]
struct StoredTable {
    config: TableConfig,
    status: TableStatus,
    rows: BTreeMap<RowKey, Item>,
}

impl StoredTable {
    fn new(config: TableConfig, status: TableStatus) -> Self {
        Self {
            config,
            status,
            rows: BTreeMap::new(),
        }
    }

    fn state(&self) -> TableState {
        TableState {
            status: self.status,
            gsis: self
                .config
                .gsis
                .iter()
                .map(|gsi| GsiState {
                    name: gsi.name.to_string(),
                    status: self.status,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    tables: HashMap<String, StoredTable>,
    batch_calls: u32,
    failing_batch_calls: HashSet<u32>,
    rejected_partitions: HashSet<String>,
}

impl State {
    fn table(&self, table_name: &str) -> Result<&StoredTable, BackendError> {
        self.tables.get(table_name).ok_or_else(not_found)
    }

    fn table_mut(&mut self, table_name: &str) -> Result<&mut StoredTable, BackendError> {
        self.tables.get_mut(table_name).ok_or_else(not_found)
    }
}

/// In-memory storage backend for testing.
///
/// Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    state: Arc<RwLock<State>>,
}

fn not_found() -> BackendError {
    BackendError::ResourceNotFound("Requested resource not found".to_string())
}

fn string_attr<'a>(item: &'a Item, name: &str) -> Option<&'a str> {
    item.get(name)
        .and_then(|value| value.as_s().ok())
        .map(String::as_str)
}

fn row_key(item: &Item) -> Result<RowKey, BackendError> {
    match (string_attr(item, PK_ATTRIBUTE), string_attr(item, SK_ATTRIBUTE)) {
        (Some(pk), Some(sk)) if !pk.is_empty() && !sk.is_empty() => {
            Ok((pk.to_string(), sk.to_string()))
        }
        _ => Err(BackendError::InvalidRequest(
            "The provided key element does not match the schema".to_string(),
        )),
    }
}

fn project(item: &Item, attributes: &[&str]) -> Item {
    if attributes.is_empty() {
        return item.clone();
    }
    item.iter()
        .filter(|(name, _)| attributes.contains(&name.as_str()))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

impl InMemoryBackend {
    /// Creates a backend with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend holding one empty, active table.
    pub fn with_table(config: TableConfig) -> Self {
        let mut state = State::default();
        state.tables.insert(
            config.table_name.clone(),
            StoredTable::new(config, TableStatus::Active),
        );
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Makes the `call_number`-th batch write (1-based) fail.
    pub async fn fail_batch_write(&self, call_number: u32) {
        self.state
            .write()
            .await
            .failing_batch_calls
            .insert(call_number);
    }

    /// Makes every write to partition `pk` fail.
    pub async fn reject_partition(&self, pk: impl Into<String>) {
        self.state
            .write()
            .await
            .rejected_partitions
            .insert(pk.into());
    }

    /// Number of rows in a table; zero when the table does not exist.
    pub async fn item_count(&self, table_name: &str) -> usize {
        self.state
            .read()
            .await
            .tables
            .get(table_name)
            .map_or(0, |table| table.rows.len())
    }

    /// Reads one row by primary key.
    pub async fn get_item(&self, table_name: &str, pk: &str, sk: &str) -> Option<Item> {
        self.state
            .read()
            .await
            .tables
            .get(table_name)?
            .rows
            .get(&(pk.to_string(), sk.to_string()))
            .cloned()
    }
}

fn positive_limit(limit: i32) -> Result<usize, BackendError> {
    usize::try_from(limit)
        .ok()
        .filter(|limit| *limit > 0)
        .ok_or_else(|| BackendError::InvalidRequest("Limit must be greater than zero".to_string()))
}

#[async_trait]
impl TableBackend for InMemoryBackend {
    async fn put_item(&self, table_name: &str, item: Item) -> Result<(), BackendError> {
        let mut state = self.state.write().await;
        let key = row_key(&item)?;

        if state.rejected_partitions.contains(&key.0) {
            return Err(BackendError::InternalServer);
        }

        let table = state.table_mut(table_name)?;
        for gsi in &table.config.gsis {
            for attr in [gsi.partition_key, gsi.sort_key] {
                if string_attr(&item, attr) == Some("") {
                    return Err(BackendError::InvalidRequest(format!(
                        "Index key attribute '{attr}' may not be an empty string"
                    )));
                }
            }
        }

        table.rows.insert(key, item);
        Ok(())
    }

    async fn query(&self, table_name: &str, query: &KeyQuery) -> Result<Vec<Item>, BackendError> {
        let state = self.state.read().await;
        let table = state.table(table_name)?;

        if let Some(index_name) = query.index_name {
            if table.config.gsi(index_name).is_none() {
                return Err(BackendError::InvalidRequest(format!(
                    "The table does not have the specified index: {index_name}"
                )));
            }
        }

        let mut matches: Vec<(&str, &RowKey, &Item)> = table
            .rows
            .iter()
            .filter(|(_, item)| {
                string_attr(item, query.hash_attribute) == Some(query.hash_value.as_str())
            })
            .filter_map(|(key, item)| {
                // Rows without the range attribute are not part of an index.
                let range_value = string_attr(item, query.range_attribute)?;
                match &query.range {
                    Some(condition) if !condition.matches(range_value) => None,
                    _ => Some((range_value, key, item)),
                }
            })
            .collect();

        if query.index_name.is_some() {
            matches.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        }

        let limit = match query.limit {
            None => usize::MAX,
            Some(limit) => positive_limit(limit)?,
        };

        Ok(matches
            .into_iter()
            .take(limit)
            .map(|(_, _, item)| item.clone())
            .collect())
    }

    async fn scan(&self, table_name: &str, request: ScanRequest) -> Result<ScanPage, BackendError> {
        let state = self.state.read().await;
        let table = state.table(table_name)?;

        let limit = positive_limit(request.limit)?;

        let start = match &request.exclusive_start_key {
            Some(key) => Bound::Excluded(row_key(key)?),
            None => Bound::Unbounded,
        };

        let rows: Vec<(&RowKey, &Item)> = table
            .rows
            .range((start, Bound::Unbounded))
            .take(limit)
            .collect();

        let last_evaluated_key = if rows.len() == limit {
            rows.last().map(|((pk, sk), _)| {
                Item::from([
                    (PK_ATTRIBUTE.to_string(), AttributeValue::S(pk.clone())),
                    (SK_ATTRIBUTE.to_string(), AttributeValue::S(sk.clone())),
                ])
            })
        } else {
            None
        };

        Ok(ScanPage {
            items: rows
                .into_iter()
                .map(|(_, item)| project(item, request.attributes))
                .collect(),
            last_evaluated_key,
        })
    }

    async fn batch_delete(&self, table_name: &str, keys: Vec<Item>) -> Result<usize, BackendError> {
        let mut state = self.state.write().await;
        state.batch_calls += 1;

        if keys.len() > MAX_BATCH_SIZE {
            return Err(BackendError::InvalidRequest(format!(
                "Too many items requested for the BatchWriteItem call: {}",
                keys.len()
            )));
        }
        if state.failing_batch_calls.contains(&state.batch_calls) {
            return Err(BackendError::InternalServer);
        }

        let keys = keys
            .iter()
            .map(row_key)
            .collect::<Result<Vec<_>, _>>()?;
        let table = state.table_mut(table_name)?;
        for key in keys {
            table.rows.remove(&key);
        }

        Ok(0)
    }

    async fn create_table(&self, config: &TableConfig) -> Result<(), BackendError> {
        let mut state = self.state.write().await;
        if state.tables.contains_key(&config.table_name) {
            return Err(BackendError::Service {
                operation: "CreateTable",
                message: format!("Table already exists: {}", config.table_name),
            });
        }

        state.tables.insert(
            config.table_name.clone(),
            StoredTable::new(config.clone(), TableStatus::Creating),
        );
        Ok(())
    }

    async fn delete_table(&self, table_name: &str) -> Result<(), BackendError> {
        let mut state = self.state.write().await;
        let table = state.table_mut(table_name)?;
        table.status = TableStatus::Deleting;
        Ok(())
    }

    async fn describe_table(&self, table_name: &str) -> Result<Option<TableState>, BackendError> {
        let mut state = self.state.write().await;
        let Some(table) = state.tables.get_mut(table_name) else {
            return Ok(None);
        };

        // Report the pending status once, then settle.
        let reported = table.state();
        let status = table.status;
        match status {
            TableStatus::Creating => table.status = TableStatus::Active,
            TableStatus::Deleting => {
                state.tables.remove(table_name);
            }
            _ => {}
        }

        Ok(Some(reported))
    }
}
