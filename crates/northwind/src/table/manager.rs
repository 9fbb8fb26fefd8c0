//! Table lifecycle: create, delete and purge.

use std::sync::Arc;
use std::time::Duration;

use aws_sdk_dynamodb::types::AttributeValue;
use northwind_core::keys::{PK_ATTRIBUTE, SK_ATTRIBUTE};
use northwind_core::storage::{BackendError, Result, StoreError};

use super::config::northwind_table_config;
use crate::backend::{Item, ScanRequest, TableBackend};
use crate::observer::{Event, Observer};

/// Largest page a purge may delete in one batch call.
pub const MAX_PURGE_PAGE_SIZE: i32 = 25;

/// How long to poll for a table status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 60,
            delay: Duration::from_secs(2),
        }
    }
}

/// Outcome of a purge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeSummary {
    /// Non-empty pages scanned.
    pub pages: u32,
    /// Items in pages whose batch delete succeeded, minus unprocessed ones.
    pub deleted: usize,
    /// Pages whose batch delete failed.
    pub failed_pages: u32,
}

/// Creates, deletes and empties the Northwind table.
pub struct TableManager {
    backend: Arc<dyn TableBackend>,
    table_name: String,
    wait: WaitPolicy,
    purge_page_size: i32,
    observer: Arc<dyn Observer>,
}

impl TableManager {
    pub fn new(
        backend: Arc<dyn TableBackend>,
        table_name: impl Into<String>,
        observer: Arc<dyn Observer>,
    ) -> Self {
        Self {
            backend,
            table_name: table_name.into(),
            wait: WaitPolicy::default(),
            purge_page_size: MAX_PURGE_PAGE_SIZE,
            observer,
        }
    }

    pub fn with_wait_policy(mut self, wait: WaitPolicy) -> Self {
        self.wait = wait;
        self
    }

    /// Sets the purge page size, clamped to `1..=25`.
    pub fn with_purge_page_size(mut self, page_size: i32) -> Self {
        self.purge_page_size = page_size.clamp(1, MAX_PURGE_PAGE_SIZE);
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Creates the table and waits until it and its index are active.
    pub async fn create_table(&self) -> Result<()> {
        let table = self.table_name.as_str();
        self.observer.event(&Event::TableCreating { table });

        let create_error = |source| StoreError::Create {
            table: self.table_name.clone(),
            source,
        };

        self.backend
            .create_table(&northwind_table_config(table))
            .await
            .map_err(create_error)?;
        self.wait_for_table_active().await.map_err(create_error)?;

        self.observer.event(&Event::TableCreated { table });
        Ok(())
    }

    /// Deletes the table and waits until it is gone.
    ///
    /// Deleting a table that does not exist succeeds.
    pub async fn delete_table(&self) -> Result<()> {
        let table = self.table_name.as_str();
        self.observer.event(&Event::TableDeleting { table });

        let delete_error = |source| StoreError::Delete {
            table: self.table_name.clone(),
            source,
        };

        match self.backend.delete_table(table).await {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {
                self.observer.event(&Event::TableAlreadyDeleted { table });
                return Ok(());
            }
            Err(err) => return Err(delete_error(err)),
        }

        self.wait_for_table_deleted().await.map_err(delete_error)?;
        self.observer.event(&Event::TableDeleted { table });
        Ok(())
    }

    /// Deletes every item in the table, one scan page at a time.
    ///
    /// Each page becomes one batch delete. A failed batch is reported and
    /// skipped; a failed scan aborts the purge. Not safe to run while other
    /// writers use the table.
    pub async fn purge_table(&self) -> Result<PurgeSummary> {
        let table = self.table_name.as_str();
        self.observer.event(&Event::PurgeStarted {
            table,
            page_size: self.purge_page_size,
        });

        let mut summary = PurgeSummary::default();
        let mut exclusive_start_key: Option<Item> = None;

        loop {
            let page = self
                .backend
                .scan(
                    table,
                    ScanRequest {
                        attributes: &[PK_ATTRIBUTE, SK_ATTRIBUTE],
                        limit: self.purge_page_size,
                        exclusive_start_key: exclusive_start_key.take(),
                    },
                )
                .await
                .map_err(|source| StoreError::Scan {
                    table: self.table_name.clone(),
                    source,
                })?;

            if page.items.is_empty() {
                break;
            }

            summary.pages += 1;
            let items = page.items.len();
            let keys = page.items.into_iter().map(primary_key).collect();

            match self.backend.batch_delete(table, keys).await {
                Ok(0) => summary.deleted += items,
                Ok(unprocessed) => {
                    summary.deleted += items.saturating_sub(unprocessed);
                    self.observer.event(&Event::PurgePageUnprocessed {
                        table,
                        page: summary.pages,
                        unprocessed,
                    });
                }
                Err(err) => {
                    summary.failed_pages += 1;
                    self.observer.event(&Event::PurgePageFailed {
                        table,
                        page: summary.pages,
                        items,
                        error: err.to_string(),
                    });
                }
            }

            match page.last_evaluated_key {
                Some(key) => exclusive_start_key = Some(key),
                None => break,
            }
        }

        self.observer.event(&Event::PurgeFinished {
            table,
            pages: summary.pages,
            deleted: summary.deleted,
            failed_pages: summary.failed_pages,
        });

        Ok(summary)
    }

    async fn wait_for_table_active(&self) -> std::result::Result<(), BackendError> {
        for _ in 0..self.wait.max_attempts {
            if let Some(state) = self.backend.describe_table(&self.table_name).await? {
                if state.is_ready() {
                    return Ok(());
                }
            }
            tokio::time::sleep(self.wait.delay).await;
        }

        Err(BackendError::WaitTimeout {
            state: "active",
            attempts: self.wait.max_attempts,
        })
    }

    async fn wait_for_table_deleted(&self) -> std::result::Result<(), BackendError> {
        for _ in 0..self.wait.max_attempts {
            if self.backend.describe_table(&self.table_name).await?.is_none() {
                return Ok(());
            }
            tokio::time::sleep(self.wait.delay).await;
        }

        Err(BackendError::WaitTimeout {
            state: "deleted",
            attempts: self.wait.max_attempts,
        })
    }
}

/// Keeps only the primary key attributes of a scanned item.
fn primary_key(mut item: Item) -> Item {
    item.retain(|name, value| {
        (name == PK_ATTRIBUTE || name == SK_ATTRIBUTE) && matches!(value, AttributeValue::S(_))
    });
    item
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::observer::recording::RecordingObserver;
    use crate::table::northwind_table_config;

    const TABLE: &str = "northwind";

    fn no_delay() -> WaitPolicy {
        WaitPolicy {
            max_attempts: 3,
            delay: Duration::ZERO,
        }
    }

    fn manager(backend: &InMemoryBackend) -> (TableManager, Arc<RecordingObserver>) {
        let observer = Arc::new(RecordingObserver::default());
        let manager = TableManager::new(Arc::new(backend.clone()), TABLE, observer.clone())
            .with_wait_policy(no_delay());
        (manager, observer)
    }

    async fn fill(backend: &InMemoryBackend, count: usize) {
        for i in 0..count {
            let item = Item::from([
                ("pk".to_string(), AttributeValue::S(format!("products#{i}"))),
                ("sk".to_string(), AttributeValue::S("PRODUCT".to_string())),
                ("productName".to_string(), AttributeValue::S(format!("Product {i}"))),
            ]);
            backend.put_item(TABLE, item).await.unwrap();
        }
    }

    #[test]
    fn test_purge_page_size_is_clamped() {
        let backend = InMemoryBackend::new();
        let (manager, _) = manager(&backend);

        assert_eq!(manager.purge_page_size, 25);
        let manager = manager.with_purge_page_size(100);
        assert_eq!(manager.purge_page_size, 25);
        let manager = manager.with_purge_page_size(0);
        assert_eq!(manager.purge_page_size, 1);
    }

    #[test]
    fn test_primary_key_projection() {
        let item = Item::from([
            ("pk".to_string(), AttributeValue::S("1".to_string())),
            ("sk".to_string(), AttributeValue::S("ORDER".to_string())),
            ("data".to_string(), AttributeValue::S("VINET".to_string())),
        ]);

        let key = primary_key(item);
        assert_eq!(key.len(), 2);
        assert!(key.contains_key("pk"));
        assert!(key.contains_key("sk"));
    }

    #[tokio::test]
    async fn test_create_table_waits_until_active() {
        let backend = InMemoryBackend::new();
        let (manager, observer) = manager(&backend);

        manager.create_table().await.unwrap();

        let state = backend.describe_table(TABLE).await.unwrap().unwrap();
        assert!(state.is_ready());
        assert_eq!(observer.names(), vec!["table_creating", "table_created"]);
    }

    #[tokio::test]
    async fn test_create_existing_table_fails() {
        let backend = InMemoryBackend::with_table(northwind_table_config(TABLE));
        let (manager, _) = manager(&backend);

        let err = manager.create_table().await.unwrap_err();
        assert!(matches!(err, StoreError::Create { ref table, .. } if table == TABLE));
    }

    #[tokio::test]
    async fn test_create_table_times_out() {
        let backend = InMemoryBackend::new();
        let (manager, _) = manager(&backend);
        let manager = manager.with_wait_policy(WaitPolicy {
            max_attempts: 1,
            delay: Duration::ZERO,
        });

        let err = manager.create_table().await.unwrap_err();
        assert_eq!(
            err,
            StoreError::Create {
                table: TABLE.to_string(),
                source: BackendError::WaitTimeout {
                    state: "active",
                    attempts: 1,
                },
            }
        );
    }

    #[tokio::test]
    async fn test_delete_table_twice() {
        let backend = InMemoryBackend::with_table(northwind_table_config(TABLE));
        let (manager, observer) = manager(&backend);

        manager.delete_table().await.unwrap();
        assert!(backend.describe_table(TABLE).await.unwrap().is_none());

        manager.delete_table().await.unwrap();
        assert_eq!(observer.count("table_deleted"), 1);
        assert_eq!(observer.count("table_already_deleted"), 1);
    }

    #[tokio::test]
    async fn test_purge_empty_table() {
        let backend = InMemoryBackend::with_table(northwind_table_config(TABLE));
        let (manager, _) = manager(&backend);

        let summary = manager.purge_table().await.unwrap();
        assert_eq!(summary, PurgeSummary::default());
    }

    #[tokio::test]
    async fn test_purge_single_page() {
        let backend = InMemoryBackend::with_table(northwind_table_config(TABLE));
        fill(&backend, 10).await;
        let (manager, observer) = manager(&backend);

        let summary = manager.purge_table().await.unwrap();

        assert_eq!(backend.item_count(TABLE).await, 0);
        assert_eq!(summary.pages, 1);
        assert_eq!(summary.deleted, 10);
        assert_eq!(observer.names(), vec!["purge_started", "purge_finished"]);
    }

    #[tokio::test]
    async fn test_purge_many_pages() {
        let backend = InMemoryBackend::with_table(northwind_table_config(TABLE));
        fill(&backend, 60).await;
        let (manager, _) = manager(&backend);

        let summary = manager.purge_table().await.unwrap();

        assert_eq!(backend.item_count(TABLE).await, 0);
        assert_eq!(
            summary,
            PurgeSummary {
                pages: 3,
                deleted: 60,
                failed_pages: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_purge_exact_page_multiple_ends_on_empty_page() {
        let backend = InMemoryBackend::with_table(northwind_table_config(TABLE));
        fill(&backend, 50).await;
        let (manager, _) = manager(&backend);

        let summary = manager.purge_table().await.unwrap();

        assert_eq!(backend.item_count(TABLE).await, 0);
        assert_eq!(summary.pages, 2);
        assert_eq!(summary.deleted, 50);
    }

    #[tokio::test]
    async fn test_purge_continues_after_failed_page() {
        let backend = InMemoryBackend::with_table(northwind_table_config(TABLE));
        fill(&backend, 60).await;
        backend.fail_batch_write(1).await;
        let (manager, observer) = manager(&backend);

        let summary = manager.purge_table().await.unwrap();

        assert_eq!(
            summary,
            PurgeSummary {
                pages: 3,
                deleted: 35,
                failed_pages: 1,
            }
        );
        assert_eq!(backend.item_count(TABLE).await, 25);
        assert_eq!(observer.count("purge_page_failed"), 1);

        // A second pass removes what the failed batch left behind.
        let summary = manager.purge_table().await.unwrap();
        assert_eq!(summary.deleted, 25);
        assert_eq!(backend.item_count(TABLE).await, 0);
    }

    #[tokio::test]
    async fn test_purge_small_pages() {
        let backend = InMemoryBackend::with_table(northwind_table_config(TABLE));
        fill(&backend, 7).await;
        let (manager, _) = manager(&backend);
        let manager = manager.with_purge_page_size(3);

        let summary = manager.purge_table().await.unwrap();

        assert_eq!(summary.pages, 3);
        assert_eq!(summary.deleted, 7);
        assert_eq!(backend.item_count(TABLE).await, 0);
    }

    #[tokio::test]
    async fn test_purge_missing_table_fails() {
        let backend = InMemoryBackend::new();
        let (manager, observer) = manager(&backend);

        let err = manager.purge_table().await.unwrap_err();
        assert!(matches!(err, StoreError::Scan { .. }));
        assert_eq!(observer.count("purge_finished"), 0);
    }
}
