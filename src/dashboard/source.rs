//! Where a dashboard session loads its classified snapshot from.

use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{PulseError, Result};
use crate::models::ClassifiedSnapshot;
use crate::snapshot;

/// Path of the classified snapshot endpoint.
pub const CLASSIFIED_PATH: &str = "/classified-reviews";

#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Load the classified snapshot. A snapshot that does not exist yet is
    /// reported as [`PulseError::DataUnavailable`].
    async fn load(&self) -> Result<ClassifiedSnapshot>;
}

/// Reads the classified snapshot file directly.
pub struct FileSnapshotSource {
    path: PathBuf,
}

impl FileSnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SnapshotSource for FileSnapshotSource {
    async fn load(&self) -> Result<ClassifiedSnapshot> {
        snapshot::read_classified(&self.path)
    }
}

/// Fetches the snapshot from a running server's `/classified-reviews`.
pub struct HttpSnapshotSource {
    client: Client,
    url: String,
}

impl HttpSnapshotSource {
    /// `base` is the server origin, e.g. `http://127.0.0.1:5000`.
    pub fn new(base: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: format!("{}{}", base.trim_end_matches('/'), CLASSIFIED_PATH),
        })
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    async fn load(&self) -> Result<ClassifiedSnapshot> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| PulseError::DataUnavailable(format!("{}: {}", self.url, e)))?;

        if !resp.status().is_success() {
            return Err(PulseError::DataUnavailable(format!(
                "{} returned {}",
                self.url,
                resp.status()
            )));
        }

        resp.json::<ClassifiedSnapshot>()
            .await
            .map_err(|e| PulseError::DataUnavailable(format!("decoding {}: {}", self.url, e)))
    }
}
