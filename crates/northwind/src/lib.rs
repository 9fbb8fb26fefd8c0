//! Northwind catalog stored in a single DynamoDB table.
//!
//! - [`storage::SingleTableRepository`] implements the typed access patterns.
//! - [`table::TableManager`] creates, deletes and purges the table.
//! - [`loader::BulkLoader`] imports the Northwind CSV files.
//! - [`queries::run_sample_queries`] exercises every access pattern.

pub mod backend;
pub mod config;
pub mod loader;
pub mod observer;
pub mod queries;
pub mod storage;
pub mod table;
