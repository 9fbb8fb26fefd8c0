//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `BackendError` from `northwind_core::storage`.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::operation::batch_write_item::BatchWriteItemError;
use aws_sdk_dynamodb::operation::create_table::CreateTableError;
use aws_sdk_dynamodb::operation::delete_table::DeleteTableError;
use aws_sdk_dynamodb::operation::describe_table::DescribeTableError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::query::QueryError;
use aws_sdk_dynamodb::operation::scan::ScanError;
use northwind_core::storage::BackendError;

fn table_not_found() -> BackendError {
    BackendError::ResourceNotFound("Table not found".to_string())
}

fn service_error(operation: &'static str, err: impl std::error::Error) -> BackendError {
    BackendError::Service {
        operation,
        message: DisplayErrorContext(err).to_string(),
    }
}

/// Map a PutItem SDK error to BackendError.
pub fn map_put_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
) -> BackendError {
    match err.into_service_error() {
        PutItemError::ResourceNotFoundException(_) => table_not_found(),
        PutItemError::ProvisionedThroughputExceededException(_)
        | PutItemError::RequestLimitExceeded(_) => BackendError::Throttled,
        PutItemError::InternalServerError(_) => BackendError::InternalServer,
        err => service_error("PutItem", err),
    }
}

/// Map a Query SDK error to BackendError.
pub fn map_query_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<QueryError, R>,
) -> BackendError {
    match err.into_service_error() {
        QueryError::ResourceNotFoundException(_) => table_not_found(),
        QueryError::ProvisionedThroughputExceededException(_)
        | QueryError::RequestLimitExceeded(_) => BackendError::Throttled,
        QueryError::InternalServerError(_) => BackendError::InternalServer,
        err => service_error("Query", err),
    }
}

/// Map a Scan SDK error to BackendError.
pub fn map_scan_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<ScanError, R>,
) -> BackendError {
    match err.into_service_error() {
        ScanError::ResourceNotFoundException(_) => table_not_found(),
        ScanError::ProvisionedThroughputExceededException(_)
        | ScanError::RequestLimitExceeded(_) => BackendError::Throttled,
        ScanError::InternalServerError(_) => BackendError::InternalServer,
        err => service_error("Scan", err),
    }
}

/// Map a BatchWriteItem SDK error to BackendError.
pub fn map_batch_write_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<BatchWriteItemError, R>,
) -> BackendError {
    match err.into_service_error() {
        BatchWriteItemError::ResourceNotFoundException(_) => table_not_found(),
        BatchWriteItemError::ProvisionedThroughputExceededException(_)
        | BatchWriteItemError::RequestLimitExceeded(_) => BackendError::Throttled,
        BatchWriteItemError::InternalServerError(_) => BackendError::InternalServer,
        err => service_error("BatchWriteItem", err),
    }
}

/// Map a CreateTable SDK error to BackendError.
pub fn map_create_table_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<CreateTableError, R>,
) -> BackendError {
    match err.into_service_error() {
        CreateTableError::InternalServerError(_) => BackendError::InternalServer,
        err => service_error("CreateTable", err),
    }
}

/// Map a DeleteTable SDK error to BackendError.
///
/// `ResourceNotFound` is kept distinct so callers can treat deleting a
/// missing table as done.
pub fn map_delete_table_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DeleteTableError, R>,
) -> BackendError {
    match err.into_service_error() {
        DeleteTableError::ResourceNotFoundException(_) => table_not_found(),
        DeleteTableError::InternalServerError(_) => BackendError::InternalServer,
        err => service_error("DeleteTable", err),
    }
}

/// Map a DescribeTable SDK error to BackendError.
pub fn map_describe_table_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DescribeTableError, R>,
) -> BackendError {
    match err.into_service_error() {
        DescribeTableError::ResourceNotFoundException(_) => table_not_found(),
        DescribeTableError::InternalServerError(_) => BackendError::InternalServer,
        err => service_error("DescribeTable", err),
    }
}
