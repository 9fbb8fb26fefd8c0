use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use northwind::backend::{AwsConfig, DynamoDbBackend, TableBackend, DEFAULT_REGION};
use northwind::config::{Config, LogFormat};
use northwind::loader::BulkLoader;
use northwind::observer::{Observer, TracingObserver};
use northwind::queries::run_sample_queries;
use northwind::storage::SingleTableRepository;
use northwind::table::TableManager;

/// Northwind - Load and query the Northwind dataset in a single DynamoDB table
#[derive(Parser, Debug)]
#[command(name = "northwind")]
#[command(version, about, long_about = None)]
struct Cli {
    /// AWS region of the table
    #[arg(long, default_value = DEFAULT_REGION, env = "AWS_REGION", global = true)]
    aws_region: String,

    /// Name of the DynamoDB table
    #[arg(
        long,
        default_value = "dynamodb-single-table-example",
        env = "DYNAMODB_TABLE_NAME",
        global = true
    )]
    dynamodb_table_name: String,

    /// Custom endpoint URL (e.g. DynamoDB Local)
    #[arg(long, env = "AWS_ENDPOINT_URL", global = true)]
    endpoint_url: Option<String>,

    /// Log output format (overrides LOG_FORMAT)
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the table and wait until it is active
    CreateTable,
    /// Delete the table and wait until it is gone
    DeleteTable,
    /// Delete every item in the table
    PurgeTable {
        /// Items per delete batch, 1 to 25 (overrides PURGE_PAGE_SIZE)
        #[arg(long)]
        page_size: Option<i32>,
    },
    /// Load the Northwind CSV files into the table
    LoadTableData {
        /// Directory holding the CSV files
        #[arg(long, default_value = "csv")]
        csv_directory: PathBuf,
    },
    /// Run the sample access patterns against the table
    RunQueries,
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "northwind=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }

    init_tracing(config.log_format);

    if let Err(err) = run(cli, config).await {
        let message = format!("{err:#}");
        tracing::error!(error = %message, "Command failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    let aws = AwsConfig::new(cli.aws_region, cli.endpoint_url);
    tracing::info!(
        target_env = %aws.target_display(),
        table = %cli.dynamodb_table_name,
        "Using DynamoDB"
    );

    let backend: Arc<dyn TableBackend> = Arc::new(DynamoDbBackend::connect(&aws).await);
    let observer: Arc<dyn Observer> = Arc::new(TracingObserver);
    let table_name = cli.dynamodb_table_name;

    let manager = || {
        TableManager::new(backend.clone(), table_name.clone(), observer.clone())
            .with_wait_policy(config.wait_policy())
            .with_purge_page_size(config.purge_page_size)
    };
    let repository =
        || SingleTableRepository::new(backend.clone(), table_name.clone(), observer.clone());

    match cli.command {
        Command::CreateTable => manager()
            .create_table()
            .await
            .context("Could not create table")?,
        Command::DeleteTable => manager()
            .delete_table()
            .await
            .context("Could not delete table")?,
        Command::PurgeTable { page_size } => {
            let mut manager = manager();
            if let Some(page_size) = page_size {
                manager = manager.with_purge_page_size(page_size);
            }
            manager.purge_table().await.context("Could not purge table")?;
        }
        Command::LoadTableData { csv_directory } => {
            let loader = BulkLoader::new(Arc::new(repository()), observer.clone());
            loader
                .load(&csv_directory)
                .await
                .context("Error loading data")?;
        }
        Command::RunQueries => {
            let report = run_sample_queries(&repository())
                .await
                .context("Error running queries")?;
            for line in &report.lines {
                tracing::info!(
                    query = line.label,
                    parameter = %line.parameter,
                    results = ?line.results,
                    "{line}"
                );
            }
        }
    }

    Ok(())
}
