//! Paginated review fetcher.
//!
//! Pulls reviews newest-first from the SerpApi `google_play_product` engine,
//! following `next_page_token` until one of three things happens:
//!
//! 1. `max_total` reviews have been collected,
//! 2. the API stops returning a pagination token, or
//! 3. `max_calls` requests have been made (safety cap).
//!
//! Results keep response order and are truncated to `max_total`. Any API
//! `error` field or transport failure aborts the run before anything is
//! written. There is no retry; a failed fetch is re-run by hand.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{Config, Credentials, FetchConfig};
use crate::error::{PulseError, Result};
use crate::models::{RawReview, RawSnapshot};
use crate::snapshot;

/// One page of the search API response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiPage {
    #[serde(default)]
    pub reviews: Vec<RawReview>,
    #[serde(default)]
    pub search_metadata: Option<PageMetadata>,
    #[serde(default)]
    pub serpapi_pagination: Option<PageMetadata>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageMetadata {
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl ApiPage {
    /// The cursor for the following page, if any. An empty token counts as
    /// no token.
    pub fn next_page_token(&self) -> Option<String> {
        [&self.search_metadata, &self.serpapi_pagination]
            .into_iter()
            .flatten()
            .filter_map(|m| m.next_page_token.clone())
            .find(|t| !t.is_empty())
    }
}

/// A paginated source of reviews.
///
/// [`SerpApiSource`] is the production implementation; tests substitute
/// scripted sources to exercise the loop guards.
#[async_trait]
pub trait ReviewSource: Send + Sync {
    /// Fetch one page. `page_token` is `None` for the first request.
    async fn fetch_page(&self, page_token: Option<&str>) -> Result<ApiPage>;
}

/// Reqwest-backed SerpApi client.
pub struct SerpApiSource {
    client: Client,
    endpoint: String,
    engine: String,
    store: String,
    per_page: usize,
    credentials: Credentials,
}

impl SerpApiSource {
    pub fn new(config: &FetchConfig, credentials: &Credentials) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            engine: config.engine.clone(),
            store: config.store.clone(),
            per_page: config.per_page,
            credentials: credentials.clone(),
        })
    }

    fn query(&self, page_token: Option<&str>) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("engine", self.engine.clone()),
            ("store", self.store.clone()),
            ("product_id", self.credentials.product_id.clone()),
            ("all_reviews", "true".to_string()),
            // 2 = newest first
            ("sort_by", "2".to_string()),
            ("num", self.per_page.to_string()),
            ("api_key", self.credentials.api_key.clone()),
        ];
        if let Some(token) = page_token {
            params.push(("next_page_token", token.to_string()));
        }
        params
    }
}

#[async_trait]
impl ReviewSource for SerpApiSource {
    async fn fetch_page(&self, page_token: Option<&str>) -> Result<ApiPage> {
        debug!(has_token = page_token.is_some(), "requesting review page");

        let resp = self
            .client
            .get(&self.endpoint)
            .query(&self.query(page_token))
            .send()
            .await
            .map_err(|e| PulseError::Upstream(format!("request failed: {}", e)))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| PulseError::Upstream(format!("reading response body: {}", e)))?;

        match serde_json::from_str::<ApiPage>(&body) {
            // Error bodies come back with 4xx statuses; prefer the API's message.
            Ok(page) if page.error.is_some() => Ok(page),
            Ok(page) if status.is_success() => Ok(page),
            Ok(_) => Err(PulseError::Upstream(format!("HTTP {}", status))),
            Err(e) if status.is_success() => Err(PulseError::Upstream(format!(
                "decoding response JSON: {}",
                e
            ))),
            Err(_) => Err(PulseError::Upstream(format!("HTTP {}", status))),
        }
    }
}

/// Loop guards for [`fetch_all_reviews`].
#[derive(Debug, Clone, Copy)]
pub struct FetchLimits {
    pub max_total: usize,
    pub max_calls: usize,
}

impl From<&FetchConfig> for FetchLimits {
    fn from(config: &FetchConfig) -> Self {
        Self {
            max_total: config.max_total,
            max_calls: config.max_calls,
        }
    }
}

/// Collect reviews from `source` until a loop guard trips.
pub async fn fetch_all_reviews(
    source: &dyn ReviewSource,
    limits: FetchLimits,
) -> Result<Vec<RawReview>> {
    let mut collected: Vec<RawReview> = Vec::new();
    let mut token: Option<String> = None;
    let mut calls = 0usize;

    while collected.len() < limits.max_total {
        let page = source.fetch_page(token.as_deref()).await?;
        calls += 1;

        if let Some(err) = page.error.as_ref() {
            return Err(PulseError::Upstream(err.clone()));
        }

        token = page.next_page_token();
        let page_len = page.reviews.len();
        collected.extend(page.reviews);
        info!(
            call = calls,
            page = page_len,
            collected = collected.len(),
            "fetched review page"
        );

        if token.is_none() {
            break;
        }
        if calls >= limits.max_calls {
            warn!(calls, "call safety limit reached, stopping pagination");
            break;
        }
    }

    collected.truncate(limits.max_total);
    Ok(collected)
}

/// Result of a fetch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The snapshot was already written today; nothing was fetched.
    Skipped { path: PathBuf },
    /// A new snapshot was written.
    Saved { path: PathBuf, count: usize },
}

/// Resolve credentials and run the fetch against SerpApi.
///
/// Credentials are checked before anything else so a misconfigured run
/// fails without touching the network or the filesystem.
pub async fn run_fetch(config: &Config, force: bool) -> Result<FetchOutcome> {
    let credentials = Credentials::resolve(&config.credentials)?;
    let source = SerpApiSource::new(&config.fetch, &credentials)?;
    run_fetch_with(&source, config, &credentials.product_id, force).await
}

/// Freshness check, fetch loop, and snapshot write against any source.
pub async fn run_fetch_with(
    source: &dyn ReviewSource,
    config: &Config,
    product_id: &str,
    force: bool,
) -> Result<FetchOutcome> {
    let path = config.storage.raw_path();

    if !force && snapshot::is_from_today(&path) {
        info!(path = %path.display(), "snapshot is from today, skipping fetch");
        return Ok(FetchOutcome::Skipped { path });
    }

    info!(product_id, "fetching reviews");
    let reviews = fetch_all_reviews(source, FetchLimits::from(&config.fetch)).await?;

    let payload = RawSnapshot {
        product_id: product_id.to_string(),
        fetched_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        count: reviews.len(),
        reviews,
    };
    snapshot::write_raw(&path, &payload)?;

    Ok(FetchOutcome::Saved {
        path,
        count: payload.count,
    })
}

/// Run the fetch and report the outcome to the operator. Returns `true`
/// when a snapshot was saved or the run was skipped as fresh.
pub async fn run_fetch_command(config: &Config, force: bool) -> bool {
    match run_fetch(config, force).await {
        Ok(FetchOutcome::Skipped { path }) => {
            println!(
                "{} is from today, skipping fetch. Use --force to override.",
                path.display()
            );
            true
        }
        Ok(FetchOutcome::Saved { path, count }) => {
            println!("Saved {} reviews to {}", count, path.display());
            true
        }
        Err(e @ PulseError::Configuration(_)) => {
            eprintln!("{}", e);
            false
        }
        Err(e) => {
            eprintln!("Fetch failed: {}", e);
            false
        }
    }
}
