use crate::keys::{DATA_ATTRIBUTE, GSI_NAME, PK_ATTRIBUTE, SK_ATTRIBUTE};

/// Condition on the range key of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeCondition {
    Equals(String),
    BeginsWith(String),
}

impl RangeCondition {
    /// Evaluates the condition against a range key value.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            RangeCondition::Equals(expected) => value == expected,
            RangeCondition::BeginsWith(prefix) => value.starts_with(prefix.as_str()),
        }
    }
}

/// A key-condition query against the table or its secondary index.
///
/// Only the two key layouts of the table exist: the primary key
/// (`pk`, `sk`) and `gsi_1` (`sk`, `data`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyQuery {
    /// `None` targets the table's primary key.
    pub index_name: Option<&'static str>,
    pub hash_attribute: &'static str,
    pub hash_value: String,
    pub range_attribute: &'static str,
    pub range: Option<RangeCondition>,
    pub limit: Option<i32>,
}

impl KeyQuery {
    /// Equality on `pk`.
    pub fn primary(pk: impl Into<String>) -> Self {
        Self {
            index_name: None,
            hash_attribute: PK_ATTRIBUTE,
            hash_value: pk.into(),
            range_attribute: SK_ATTRIBUTE,
            range: None,
            limit: None,
        }
    }

    /// Equality on `sk` through `gsi_1`.
    pub fn secondary(sk: impl Into<String>) -> Self {
        Self {
            index_name: Some(GSI_NAME),
            hash_attribute: SK_ATTRIBUTE,
            hash_value: sk.into(),
            range_attribute: DATA_ATTRIBUTE,
            range: None,
            limit: None,
        }
    }

    pub fn range_equals(mut self, value: impl Into<String>) -> Self {
        self.range = Some(RangeCondition::Equals(value.into()));
        self
    }

    pub fn range_begins_with(mut self, prefix: impl Into<String>) -> Self {
        self.range = Some(RangeCondition::BeginsWith(prefix.into()));
        self
    }

    /// Caps the number of items evaluated by the query.
    pub fn with_limit(mut self, limit: i32) -> Self {
        self.limit = Some(limit);
        self
    }
}
