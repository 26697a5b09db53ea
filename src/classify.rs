//! External classifier hook.
//!
//! Classification is not done in-process. The operator configures a command
//! under `[classifier]` that reads the raw snapshot and writes the
//! classified snapshot; this module runs it and checks that a readable
//! classified snapshot came out the other end.
//!
//! The command receives both paths through the environment:
//!
//! | Variable | Value |
//! |----------|-------|
//! | `PULSE_RAW_SNAPSHOT` | path of the raw snapshot (`fetch.json`) |
//! | `PULSE_CLASSIFIED_SNAPSHOT` | path to write (`classified_reviews.json`) |

use tokio::process::Command;
use tracing::info;

use crate::config::Config;
use crate::error::{PulseError, Result};
use crate::models::Summary;
use crate::snapshot;

pub const RAW_SNAPSHOT_VAR: &str = "PULSE_RAW_SNAPSHOT";
pub const CLASSIFIED_SNAPSHOT_VAR: &str = "PULSE_CLASSIFIED_SNAPSHOT";

/// Run the configured classifier and return the summary it wrote.
pub async fn run_classifier(config: &Config) -> Result<Summary> {
    let (program, args) = config.classifier.command.split_first().ok_or_else(|| {
        PulseError::Configuration("classifier.command is not set in the config file".to_string())
    })?;

    let raw = config.storage.raw_path();
    if !raw.exists() {
        return Err(PulseError::Classifier(format!(
            "{} not found. Run the fetcher first.",
            raw.display()
        )));
    }
    let classified = config.storage.classified_path();

    info!(command = %config.classifier.command.join(" "), "running classifier");
    let status = Command::new(program)
        .args(args)
        .env(RAW_SNAPSHOT_VAR, &raw)
        .env(CLASSIFIED_SNAPSHOT_VAR, &classified)
        .status()
        .await
        .map_err(|e| PulseError::Classifier(format!("could not start '{}': {}", program, e)))?;

    if !status.success() {
        return Err(PulseError::Classifier(format!(
            "'{}' exited with {}",
            program, status
        )));
    }

    let snap = snapshot::read_classified(&classified).map_err(|e| match e {
        PulseError::DataUnavailable(msg) => PulseError::Classifier(format!(
            "command succeeded but wrote no output: {}",
            msg
        )),
        other => other,
    })?;
    Ok(snap.summary)
}
