//! Fougere CLI - reconcile Cloud Tasks queues from a settings file

mod settings;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::sync::Arc;
use std::time::Duration;
use tabled::{Table, Tabled};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fougere_core::application::Reconciler;
use fougere_core::domain::CloudTasksConfig;
use fougere_core::port::{QueueClient, TracingObserver};
use fougere_infra_cloudtasks::{CloudTasksClient, CloudTasksClientConfig, DEFAULT_ENDPOINT};

use settings::DEFAULT_CONFIG_PATH;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "fougere")]
#[command(about = "Reconcile Cloud Tasks queues against their declared configuration", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (YAML, `cloudTasks:` section)
    #[arg(short, long, env = "FOUGERE_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Client name used to namespace queue names
    #[arg(long, env = "FOUGERE_CLIENT_NAME")]
    client_name: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Create missing queues and update existing ones
    Apply {
        /// Cloud Tasks API endpoint
        #[arg(long, env = "FOUGERE_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
        endpoint: String,

        /// OAuth2 access token (requests are unauthenticated when omitted)
        #[arg(long, env = "FOUGERE_ACCESS_TOKEN", hide_env_values = true)]
        access_token: Option<String>,

        /// Per-request timeout in seconds
        #[arg(long, default_value = "30")]
        timeout_secs: u64,
    },

    /// Validate the settings file and list the resolved queues
    Validate,
}

#[derive(Tabled)]
struct QueueRow {
    key: String,
    name: String,
    parent: String,
    backoff: String,
    max_concurrent: i64,
    max_per_second: f64,
}

fn queue_rows(config: &CloudTasksConfig) -> Vec<QueueRow> {
    config
        .queues
        .iter()
        .map(|(key, spec)| QueueRow {
            key: key.clone(),
            name: spec.name.clone(),
            parent: spec.parent(),
            backoff: format!("{} .. {}", spec.min_backoff, spec.max_backoff),
            max_concurrent: spec.max_concurrent_dispatches,
            max_per_second: spec.max_dispatches_per_second,
        })
        .collect()
}

fn init_logging() -> Result<()> {
    // JSON for production, pretty for development
    let log_format = std::env::var("FOUGERE_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("fougere=info"))
        .context("Failed to create env filter")?;

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

/// Reconcile `config` through `client`, logging progress with tracing
async fn apply(config: &CloudTasksConfig, client: Arc<dyn QueueClient>) -> Result<()> {
    let reconciler = Reconciler::new(client, Arc::new(TracingObserver));
    reconciler
        .reconcile(config)
        .await
        .context("Cloud Tasks reconcile failed")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    info!("Fougere v{} starting...", VERSION);

    let settings = settings::load_settings(&cli.config)?;
    let config = settings::resolve(settings, &cli.client_name)?;

    match cli.command {
        Commands::Validate => {
            println!(
                "{}",
                format!("✓ {} queue(s) valid", config.len()).green().bold()
            );
            if !config.is_empty() {
                println!();
                println!("{}", Table::new(queue_rows(&config)));
            }
        }

        Commands::Apply {
            endpoint,
            access_token,
            timeout_secs,
        } => {
            info!(endpoint = %endpoint, queues = config.len(), "Connecting to Cloud Tasks");

            let client = Arc::new(CloudTasksClient::new(CloudTasksClientConfig {
                endpoint,
                timeout: Duration::from_secs(timeout_secs),
                access_token,
            })?);

            match apply(&config, client).await {
                Ok(()) => {
                    println!(
                        "{}",
                        format!("✓ {} queue(s) reconciled", config.len()).green().bold()
                    );
                }
                Err(e) => {
                    println!("{} {:#}", "✗".red().bold(), e);
                    return Err(e);
                }
            }
        }
    }

    Ok(())
}
