//! CLI for running audit batches without the HTTP server
//!
//! Uses the same configuration and dependencies as the server and prints
//! JSON to stdout, so it can be driven from cron or a shell loop.

use anyhow::{Context, Result};
use audit_engine::{BatchRequest, DEFAULT_STATUS_SAMPLE};
use clap::{Parser, Subcommand};
use harbor_server::{kernel::ServerDeps, Config};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "audit_cli")]
#[command(about = "Run AI visibility audits from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit one page of subjects
    Run {
        /// Only subjects in this category
        #[arg(long)]
        category: Option<String>,

        #[arg(long, default_value_t = 10)]
        batch_size: usize,

        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Include subjects without enrichment data
        #[arg(long)]
        all: bool,

        /// Re-audit subjects that already have a result
        #[arg(long)]
        force: bool,
    },

    /// Show audit totals and a sample of recent results
    Status {
        #[arg(long, default_value_t = DEFAULT_STATUS_SAMPLE)]
        sample: usize,
    },
}

impl Commands {
    fn batch_request(
        category: Option<String>,
        batch_size: usize,
        offset: usize,
        all: bool,
        force: bool,
    ) -> BatchRequest {
        let mut request = BatchRequest::new(batch_size, offset);
        if let Some(category) = category {
            request = request.with_category(category);
        }
        if all {
            request = request.including_unenriched();
        }
        if force {
            request = request.forced();
        }
        request
    }
}

fn output<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,harbor_server=debug,audit_engine=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    let deps = ServerDeps::from_config(&config)
        .await
        .context("Failed to build dependencies")?;

    match cli.command {
        Commands::Run {
            category,
            batch_size,
            offset,
            all,
            force,
        } => {
            let request = Commands::batch_request(category, batch_size, offset, all, force);
            let summary = deps
                .orchestrator
                .run(&request)
                .await
                .context("Audit batch failed")?;
            output(&summary)
        }
        Commands::Status { sample } => {
            let stats = deps
                .orchestrator
                .status(sample)
                .await
                .context("Failed to read audit status")?;
            output(&stats)
        }
    }
}
