//! # `scrape`
//!
//! Fetch the latest reviews for `PRODUCT_ID` and write `reviews/fetch.json`.
//!
//! ```bash
//! SERPAPI_KEY=... PRODUCT_ID=com.example.app scrape
//! scrape --force    # refetch even if fetch.json was written today
//! ```
//!
//! Exit codes: `0` on success or when skipped as fresh, `1` on missing or
//! placeholder credentials and on any fetch failure.
//!
//! Settings other than credentials come from `./config/pulse.toml` (or the
//! file named by `PULSE_CONFIG`) when present, otherwise the defaults.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use review_pulse::{config, fetch, logging};

/// Fetch Google Play reviews through SerpApi into a JSON snapshot.
#[derive(Parser)]
#[command(name = "scrape", version)]
struct Args {
    /// Refetch even if the snapshot was already written today.
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();
    let args = Args::parse();

    let config_path = std::env::var("PULSE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./config/pulse.toml"));
    let cfg = match config::load_or_default(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };

    if fetch::run_fetch_command(&cfg, args.force).await {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
