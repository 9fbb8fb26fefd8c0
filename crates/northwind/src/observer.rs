//! Structured event sink.
//!
//! Components receive an `Arc<dyn Observer>` instead of logging through a
//! global. [`TracingObserver`] forwards every event to `tracing`.

use northwind_core::catalog::EntityKind;

/// Something worth reporting that happened inside a component.
#[derive(Debug, Clone, PartialEq)]
pub enum Event<'a> {
    TableCreating { table: &'a str },
    TableCreated { table: &'a str },
    TableDeleting { table: &'a str },
    TableDeleted { table: &'a str },
    TableAlreadyDeleted { table: &'a str },
    PurgeStarted { table: &'a str, page_size: i32 },
    /// A delete batch failed; the purge moves on to the next page.
    PurgePageFailed {
        table: &'a str,
        page: u32,
        items: usize,
        error: String,
    },
    PurgePageUnprocessed {
        table: &'a str,
        page: u32,
        unprocessed: usize,
    },
    PurgeFinished {
        table: &'a str,
        pages: u32,
        deleted: usize,
        failed_pages: u32,
    },
    QueryCompleted {
        table: &'a str,
        operation: &'static str,
        items: usize,
    },
    LoadStarted { directory: &'a str },
    /// A CSV row or a store call failed; the load continues.
    RecordSkipped {
        kind: EntityKind,
        field: &'static str,
        value: String,
        error: String,
    },
    LoadFinished {
        stored: usize,
        failed: usize,
        skipped: usize,
    },
}

impl Event<'_> {
    /// Stable event name, used as the `event` field of log records.
    pub fn name(&self) -> &'static str {
        match self {
            Event::TableCreating { .. } => "table_creating",
            Event::TableCreated { .. } => "table_created",
            Event::TableDeleting { .. } => "table_deleting",
            Event::TableDeleted { .. } => "table_deleted",
            Event::TableAlreadyDeleted { .. } => "table_already_deleted",
            Event::PurgeStarted { .. } => "purge_started",
            Event::PurgePageFailed { .. } => "purge_page_failed",
            Event::PurgePageUnprocessed { .. } => "purge_page_unprocessed",
            Event::PurgeFinished { .. } => "purge_finished",
            Event::QueryCompleted { .. } => "query_completed",
            Event::LoadStarted { .. } => "load_started",
            Event::RecordSkipped { .. } => "record_skipped",
            Event::LoadFinished { .. } => "load_finished",
        }
    }
}

/// Receives component events.
pub trait Observer: Send + Sync {
    fn event(&self, event: &Event<'_>);
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn event(&self, event: &Event<'_>) {
        let name = event.name();
        match event {
            Event::TableCreating { table } => {
                tracing::info!(event = name, table, "Creating table");
            }
            Event::TableCreated { table } => {
                tracing::info!(event = name, table, "Table is active");
            }
            Event::TableDeleting { table } => {
                tracing::info!(event = name, table, "Deleting table");
            }
            Event::TableDeleted { table } => {
                tracing::info!(event = name, table, "Table deleted");
            }
            Event::TableAlreadyDeleted { table } => {
                tracing::info!(event = name, table, "Table does not exist, nothing to delete");
            }
            Event::PurgeStarted { table, page_size } => {
                tracing::info!(event = name, table, page_size, "Purging table");
            }
            Event::PurgePageFailed {
                table,
                page,
                items,
                error,
            } => {
                tracing::error!(
                    event = name,
                    table,
                    page,
                    items,
                    error = %error,
                    "Could not delete page"
                );
            }
            Event::PurgePageUnprocessed {
                table,
                page,
                unprocessed,
            } => {
                tracing::warn!(
                    event = name,
                    table,
                    page,
                    unprocessed,
                    "Items left unprocessed"
                );
            }
            Event::PurgeFinished {
                table,
                pages,
                deleted,
                failed_pages,
            } => {
                tracing::info!(
                    event = name,
                    table,
                    pages,
                    deleted,
                    failed_pages,
                    "Purge finished"
                );
            }
            Event::QueryCompleted {
                table,
                operation,
                items,
            } => {
                tracing::debug!(event = name, table, operation, items, "Query completed");
            }
            Event::LoadStarted { directory } => {
                tracing::info!(event = name, directory, "Loading CSV data");
            }
            Event::RecordSkipped {
                kind,
                field,
                value,
                error,
            } => {
                tracing::error!(
                    event = name,
                    kind = %kind,
                    field,
                    value = %value,
                    error = %error,
                    "Record skipped"
                );
            }
            Event::LoadFinished {
                stored,
                failed,
                skipped,
            } => {
                tracing::info!(event = name, stored, failed, skipped, "Load finished");
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::recording::RecordingObserver;
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(Event::TableCreated { table: "t" }.name(), "table_created");
        assert_eq!(
            Event::RecordSkipped {
                kind: EntityKind::Product,
                field: "productName",
                value: "Chai".to_string(),
                error: "boom".to_string(),
            }
            .name(),
            "record_skipped"
        );
    }

    #[test]
    fn test_recording_observer() {
        let observer = RecordingObserver::default();
        observer.event(&Event::TableDeleting { table: "t" });
        observer.event(&Event::TableDeleted { table: "t" });
        observer.event(&Event::TableDeleted { table: "t" });

        assert_eq!(
            observer.names(),
            vec!["table_deleting", "table_deleted", "table_deleted"]
        );
        assert_eq!(observer.count("table_deleted"), 2);
        assert!(observer.rendered()[0].contains("TableDeleting"));
    }

    fn every_event() -> Vec<Event<'static>> {
        vec![
            Event::TableCreating { table: "t" },
            Event::TableCreated { table: "t" },
            Event::TableDeleting { table: "t" },
            Event::TableDeleted { table: "t" },
            Event::TableAlreadyDeleted { table: "t" },
            Event::PurgeStarted {
                table: "t",
                page_size: 25,
            },
            Event::PurgePageFailed {
                table: "t",
                page: 1,
                items: 25,
                error: "throttled".to_string(),
            },
            Event::PurgePageUnprocessed {
                table: "t",
                page: 2,
                unprocessed: 3,
            },
            Event::PurgeFinished {
                table: "t",
                pages: 2,
                deleted: 47,
                failed_pages: 1,
            },
            Event::QueryCompleted {
                table: "t",
                operation: "list_recent_orders",
                items: 0,
            },
            Event::LoadStarted { directory: "csv" },
            Event::RecordSkipped {
                kind: EntityKind::Shipper,
                field: "companyName",
                value: "Speedy Express".to_string(),
                error: "invalid digit".to_string(),
            },
            Event::LoadFinished {
                stored: 12,
                failed: 1,
                skipped: 1,
            },
        ]
    }

    #[test]
    fn test_every_event_has_a_distinct_name() {
        let events = every_event();
        let mut names: Vec<&str> = events.iter().map(Event::name).collect();
        names.sort_unstable();
        names.dedup();

        assert_eq!(names.len(), events.len());
    }

    #[test]
    fn test_tracing_observer_accepts_every_event() {
        let observer = TracingObserver;
        for event in every_event() {
            observer.event(&event);
        }
    }
}
