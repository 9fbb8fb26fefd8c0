//! DynamoDB table backend.

mod backend;
mod client;
mod error;

pub use backend::DynamoDbBackend;
pub use client::{AwsConfig, DEFAULT_REGION};
