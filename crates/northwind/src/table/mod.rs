//! Table schema and lifecycle.

mod config;
mod manager;

pub use config::{northwind_table_config, GsiConfig, TableConfig};
pub use manager::{PurgeSummary, TableManager, WaitPolicy, MAX_PURGE_PAGE_SIZE};
