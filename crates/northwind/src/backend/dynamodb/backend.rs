//! [`TableBackend`] over the AWS SDK.

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, BillingMode, DeleteRequest, GlobalSecondaryIndex,
    IndexStatus, KeySchemaElement, KeyType, Projection, ProjectionType, ScalarAttributeType,
    TableStatus as SdkTableStatus, WriteRequest,
};
use aws_sdk_dynamodb::Client;
use northwind_core::storage::{BackendError, KeyQuery, RangeCondition};

use super::client::{create_client, AwsConfig};
use super::error::{
    map_batch_write_item_error, map_create_table_error, map_delete_table_error,
    map_describe_table_error, map_put_item_error, map_query_error, map_scan_error,
};
use crate::backend::{
    GsiState, Item, ScanPage, ScanRequest, TableBackend, TableState, TableStatus,
};
use crate::table::TableConfig;

/// DynamoDB-backed table primitives.
#[derive(Debug, Clone)]
pub struct DynamoDbBackend {
    client: Client,
}

impl DynamoDbBackend {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a backend on a fresh SDK client.
    pub async fn connect(config: &AwsConfig) -> Self {
        Self::new(create_client(config).await)
    }
}

fn sdk_error(e: impl std::fmt::Display) -> BackendError {
    BackendError::InvalidRequest(e.to_string())
}

/// Key condition expression for a query, using `#hash`/`#range` and
/// `:hash`/`:range` placeholders.
pub(crate) fn key_condition_expression(query: &KeyQuery) -> String {
    match &query.range {
        None => "#hash = :hash".to_string(),
        Some(RangeCondition::Equals(_)) => "#hash = :hash AND #range = :range".to_string(),
        Some(RangeCondition::BeginsWith(_)) => {
            "#hash = :hash AND begins_with(#range, :range)".to_string()
        }
    }
}

/// Projection expression and its name placeholders for a scan.
fn projection_expression(attributes: &[&str]) -> Option<(String, Vec<(String, String)>)> {
    if attributes.is_empty() {
        return None;
    }

    let names: Vec<(String, String)> = attributes
        .iter()
        .enumerate()
        .map(|(i, name)| (format!("#k{i}"), name.to_string()))
        .collect();
    let expression = names
        .iter()
        .map(|(placeholder, _)| placeholder.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    Some((expression, names))
}

fn key_element(name: &str, key_type: KeyType) -> Result<KeySchemaElement, BackendError> {
    KeySchemaElement::builder()
        .attribute_name(name)
        .key_type(key_type)
        .build()
        .map_err(sdk_error)
}

fn key_schema(
    partition_key: &str,
    sort_key: &str,
) -> Result<Vec<KeySchemaElement>, BackendError> {
    Ok(vec![
        key_element(partition_key, KeyType::Hash)?,
        key_element(sort_key, KeyType::Range)?,
    ])
}

fn to_table_status(status: Option<&SdkTableStatus>) -> TableStatus {
    match status {
        Some(SdkTableStatus::Active) => TableStatus::Active,
        Some(SdkTableStatus::Creating) => TableStatus::Creating,
        Some(SdkTableStatus::Updating) => TableStatus::Updating,
        Some(SdkTableStatus::Deleting) => TableStatus::Deleting,
        _ => TableStatus::Unavailable,
    }
}

fn to_index_status(status: Option<&IndexStatus>) -> TableStatus {
    match status {
        Some(IndexStatus::Active) => TableStatus::Active,
        Some(IndexStatus::Creating) => TableStatus::Creating,
        Some(IndexStatus::Updating) => TableStatus::Updating,
        Some(IndexStatus::Deleting) => TableStatus::Deleting,
        _ => TableStatus::Unavailable,
    }
}

#[async_trait]
impl TableBackend for DynamoDbBackend {
    async fn put_item(&self, table_name: &str, item: Item) -> Result<(), BackendError> {
        self.client
            .put_item()
            .table_name(table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(map_put_item_error)?;

        Ok(())
    }

    async fn query(&self, table_name: &str, query: &KeyQuery) -> Result<Vec<Item>, BackendError> {
        let mut request = self
            .client
            .query()
            .table_name(table_name)
            .set_index_name(query.index_name.map(str::to_string))
            .key_condition_expression(key_condition_expression(query))
            .expression_attribute_names("#hash", query.hash_attribute)
            .expression_attribute_values(":hash", AttributeValue::S(query.hash_value.clone()))
            .set_limit(query.limit);

        if let Some(range) = &query.range {
            let value = match range {
                RangeCondition::Equals(v) | RangeCondition::BeginsWith(v) => v.clone(),
            };
            request = request
                .expression_attribute_names("#range", query.range_attribute)
                .expression_attribute_values(":range", AttributeValue::S(value));
        }

        let result = request.send().await.map_err(map_query_error)?;
        Ok(result.items.unwrap_or_default())
    }

    async fn scan(&self, table_name: &str, request: ScanRequest) -> Result<ScanPage, BackendError> {
        let mut scan = self
            .client
            .scan()
            .table_name(table_name)
            .limit(request.limit)
            .set_exclusive_start_key(request.exclusive_start_key);

        if let Some((expression, names)) = projection_expression(request.attributes) {
            scan = scan.projection_expression(expression);
            for (placeholder, name) in names {
                scan = scan.expression_attribute_names(placeholder, name);
            }
        }

        let result = scan.send().await.map_err(map_scan_error)?;

        Ok(ScanPage {
            items: result.items.unwrap_or_default(),
            last_evaluated_key: result.last_evaluated_key.filter(|key| !key.is_empty()),
        })
    }

    async fn batch_delete(&self, table_name: &str, keys: Vec<Item>) -> Result<usize, BackendError> {
        if keys.is_empty() {
            return Ok(0);
        }

        let write_requests = keys
            .into_iter()
            .map(|key| {
                let delete = DeleteRequest::builder()
                    .set_key(Some(key))
                    .build()
                    .map_err(sdk_error)?;
                Ok(WriteRequest::builder().delete_request(delete).build())
            })
            .collect::<Result<Vec<_>, BackendError>>()?;

        let result = self
            .client
            .batch_write_item()
            .request_items(table_name, write_requests)
            .send()
            .await
            .map_err(map_batch_write_item_error)?;

        let unprocessed = result
            .unprocessed_items
            .as_ref()
            .and_then(|items| items.get(table_name))
            .map_or(0, Vec::len);

        Ok(unprocessed)
    }

    async fn create_table(&self, config: &TableConfig) -> Result<(), BackendError> {
        let attribute_definitions = config
            .key_attributes()
            .into_iter()
            .map(|name| {
                AttributeDefinition::builder()
                    .attribute_name(name)
                    .attribute_type(ScalarAttributeType::S)
                    .build()
                    .map_err(sdk_error)
            })
            .collect::<Result<Vec<_>, BackendError>>()?;

        let mut request = self
            .client
            .create_table()
            .table_name(&config.table_name)
            .set_key_schema(Some(key_schema(config.partition_key, config.sort_key)?))
            .set_attribute_definitions(Some(attribute_definitions))
            .billing_mode(BillingMode::PayPerRequest);

        for gsi in &config.gsis {
            request = request.global_secondary_indexes(
                GlobalSecondaryIndex::builder()
                    .index_name(gsi.name)
                    .set_key_schema(Some(key_schema(gsi.partition_key, gsi.sort_key)?))
                    .projection(
                        Projection::builder()
                            .projection_type(ProjectionType::All)
                            .build(),
                    )
                    .build()
                    .map_err(sdk_error)?,
            );
        }

        request.send().await.map_err(map_create_table_error)?;
        Ok(())
    }

    async fn delete_table(&self, table_name: &str) -> Result<(), BackendError> {
        self.client
            .delete_table()
            .table_name(table_name)
            .send()
            .await
            .map_err(map_delete_table_error)?;
        Ok(())
    }

    async fn describe_table(&self, table_name: &str) -> Result<Option<TableState>, BackendError> {
        let response = match self.client.describe_table().table_name(table_name).send().await {
            Ok(response) => response,
            Err(err) => {
                let err = map_describe_table_error(err);
                return if err.is_not_found() { Ok(None) } else { Err(err) };
            }
        };

        let Some(table) = response.table() else {
            return Ok(None);
        };

        let gsis = table
            .global_secondary_indexes()
            .iter()
            .map(|gsi| GsiState {
                name: gsi.index_name().unwrap_or_default().to_string(),
                status: to_index_status(gsi.index_status()),
            })
            .collect();

        Ok(Some(TableState {
            status: to_table_status(table.table_status()),
            gsis,
        }))
    }
}
