//! Table schema (pure data).
//!
//! Every key attribute is a string, the table bills on demand and each
//! index projects all attributes, so the schema only records key names.

use northwind_core::keys::{DATA_ATTRIBUTE, GSI_NAME, PK_ATTRIBUTE, SK_ATTRIBUTE};

/// Key names of the table and its secondary indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    pub table_name: String,
    pub partition_key: &'static str,
    pub sort_key: &'static str,
    pub gsis: Vec<GsiConfig>,
}

/// A global secondary index keyed by two existing attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GsiConfig {
    pub name: &'static str,
    pub partition_key: &'static str,
    pub sort_key: &'static str,
}

impl TableConfig {
    /// Every attribute that appears in a key of the table or an index,
    /// each listed once.
    pub fn key_attributes(&self) -> Vec<&'static str> {
        let mut attributes = vec![self.partition_key, self.sort_key];
        for gsi in &self.gsis {
            for name in [gsi.partition_key, gsi.sort_key] {
                if !attributes.contains(&name) {
                    attributes.push(name);
                }
            }
        }
        attributes
    }

    pub fn gsi(&self, name: &str) -> Option<&GsiConfig> {
        self.gsis.iter().find(|g| g.name == name)
    }
}

/// `pk`/`sk` primary key plus `gsi_1` keyed by `sk`/`data`.
pub fn northwind_table_config(table_name: &str) -> TableConfig {
    TableConfig {
        table_name: table_name.to_string(),
        partition_key: PK_ATTRIBUTE,
        sort_key: SK_ATTRIBUTE,
        gsis: vec![GsiConfig {
            name: GSI_NAME,
            partition_key: SK_ATTRIBUTE,
            sort_key: DATA_ATTRIBUTE,
        }],
    }
}
