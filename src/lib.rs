//! # Review Pulse
//!
//! Fetches Google Play reviews through the SerpApi search API, snapshots
//! them as JSON, and serves a filterable summary dashboard.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌────────────────────┐
//! │   Fetcher   │──▶│  fetch.json  │──▶│ external classifier│
//! │  (SerpApi)  │   │ (raw snap)   │   │   (command hook)   │
//! └─────────────┘   └──────────────┘   └─────────┬──────────┘
//!                                                ▼
//!                                   classified_reviews.json
//!                                                │
//!                      ┌─────────────────────────┤
//!                      ▼                         ▼
//!                 ┌──────────┐             ┌──────────┐
//!                 │  report  │             │   HTTP   │
//!                 │  (text)  │             │dashboard │
//!                 └──────────┘             └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export SERPAPI_KEY=... PRODUCT_ID=com.example.app
//! scrape                      # fetch reviews (skips if fetched today)
//! pulse classify              # run the configured classifier command
//! pulse serve                 # dashboard on http://127.0.0.1:5000
//! pulse report --category Bugs --from 2024-01-01
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and credentials |
//! | [`error`] | Error taxonomy |
//! | [`models`] | Review, snapshot and summary types |
//! | [`snapshot`] | Snapshot file I/O and freshness check |
//! | [`fetch`] | Paginated SerpApi fetch loop |
//! | [`classify`] | External classifier command hook |
//! | [`dashboard`] | Load, filter, summarize and render pipeline |
//! | [`server`] | HTTP server |
//! | [`logging`] | `tracing` subscriber setup |

pub mod classify;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod models;
pub mod server;
pub mod snapshot;
