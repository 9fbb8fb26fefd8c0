//! AWS SDK client setup.
//!
//! Credentials come from the SDK default chain; only the region and an
//! optional endpoint override are configurable.

use aws_sdk_dynamodb::Client;

/// Region the Northwind table lives in unless told otherwise.
pub const DEFAULT_REGION: &str = "eu-central-1";

/// AWS client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsConfig {
    /// Custom endpoint URL (for local DynamoDB).
    pub endpoint_url: Option<String>,
    /// AWS region.
    pub region: String,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self::new(DEFAULT_REGION, None)
    }
}

impl AwsConfig {
    pub fn new(region: impl Into<String>, endpoint_url: Option<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.filter(|url| !url.is_empty()),
            region: region.into(),
        }
    }

    /// Returns a display string for the target environment.
    pub fn target_display(&self) -> String {
        match &self.endpoint_url {
            Some(url) => format!("Local DynamoDB ({})", url),
            None => format!("AWS DynamoDB (region: {})", self.region),
        }
    }
}

/// Creates a DynamoDB client with the given configuration.
pub async fn create_client(config: &AwsConfig) -> Client {
    let mut sdk_config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()));

    if let Some(endpoint) = &config.endpoint_url {
        sdk_config_loader = sdk_config_loader.endpoint_url(endpoint);
    }

    let sdk_config = sdk_config_loader.load().await;
    Client::new(&sdk_config)
}
