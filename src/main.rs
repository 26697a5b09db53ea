//! # Review Pulse CLI (`pulse`)
//!
//! The `pulse` binary drives the whole review pipeline: fetching from
//! SerpApi, invoking the external classifier, serving the dashboard, and
//! printing text reports.
//!
//! ## Usage
//!
//! ```bash
//! pulse --config ./config/pulse.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `pulse fetch [--force]` | Fetch reviews into the raw snapshot |
//! | `pulse classify` | Run the configured classifier command |
//! | `pulse serve` | Start the dashboard server |
//! | `pulse run [--force]` | Fetch, classify, then serve |
//! | `pulse report` | Print the (filtered) summary and table |
//!
//! ## Examples
//!
//! ```bash
//! # One-shot: fetch (unless already fetched today), classify, serve
//! pulse run
//!
//! # Bugs and crashes from January, read from a running server
//! pulse report --from 2024-01-01 --to 2024-01-31 \
//!     --category Bugs --category Crashes --endpoint http://127.0.0.1:5000
//! ```

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use review_pulse::config::{self, Config};
use review_pulse::dashboard::filter::FilterState;
use review_pulse::dashboard::{
    DashboardSession, FileSnapshotSource, HttpSnapshotSource, SnapshotSource,
};
use review_pulse::models::Category;
use review_pulse::{classify, fetch, logging, server};

/// Review Pulse: fetch app reviews and explore them on a dashboard.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. A missing file means built-in defaults.
#[derive(Parser)]
#[command(
    name = "pulse",
    version,
    about = "Review Pulse: fetch app reviews and explore them on a dashboard"
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/pulse.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch reviews into the raw snapshot.
    ///
    /// Skipped when the snapshot was already written today.
    Fetch {
        /// Refetch even if the snapshot is from today.
        #[arg(long)]
        force: bool,
    },

    /// Run the external classifier command from `[classifier]`.
    Classify,

    /// Start the dashboard HTTP server.
    Serve,

    /// Fetch, classify (if a classifier command is configured), then serve.
    Run {
        /// Refetch even if the snapshot is from today.
        #[arg(long)]
        force: bool,
    },

    /// Print the summary, stat grid and review table as text.
    Report {
        /// Only reviews on or after this date (YYYY-MM-DD).
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,

        /// Only reviews on or before this date (YYYY-MM-DD).
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,

        /// Only these categories. Repeat for several.
        #[arg(long = "category")]
        categories: Vec<Category>,

        /// Read the snapshot from a running server instead of the local file.
        #[arg(long)]
        endpoint: Option<String>,
    },
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}': expected YYYY-MM-DD", s))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    logging::init();
    let cli = Cli::parse();
    let cfg = config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Fetch { force } => {
            if !fetch::run_fetch_command(&cfg, force).await {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Classify => {
            let summary = classify::run_classifier(&cfg).await?;
            println!("Classified {} reviews.", summary.total);
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Run { force } => {
            if !fetch::run_fetch_command(&cfg, force).await {
                return Ok(ExitCode::FAILURE);
            }
            run_classifier_step(&cfg).await?;
            server::run_server(&cfg).await?;
        }
        Commands::Report {
            from,
            to,
            categories,
            endpoint,
        } => {
            let filter = FilterState {
                from_date: from,
                to_date: to,
                categories: categories.into_iter().collect(),
            };
            run_report(&cfg, filter, endpoint.as_deref()).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn run_classifier_step(cfg: &Config) -> anyhow::Result<()> {
    if !cfg.classifier.is_configured() {
        tracing::info!("classifier.command not set, serving the existing classified snapshot");
        return Ok(());
    }
    let summary = classify::run_classifier(cfg)
        .await
        .context("classification step failed")?;
    println!("Classified {} reviews.", summary.total);
    Ok(())
}

async fn run_report(
    cfg: &Config,
    filter: FilterState,
    endpoint: Option<&str>,
) -> anyhow::Result<()> {
    let source: Box<dyn SnapshotSource> = match endpoint {
        Some(base) => Box::new(HttpSnapshotSource::new(base, cfg.fetch.timeout_secs)?),
        None => Box::new(FileSnapshotSource::new(cfg.storage.classified_path())),
    };

    let mut session = DashboardSession::new();
    if session.load(source.as_ref()).await {
        session.apply_filters(filter);
    }
    print!("{}", session.render_text());
    Ok(())
}
