//! Per-session dashboard state.
//!
//! ```text
//! Unloaded ──load──▶ Loaded ──apply_filters──▶ Filtered
//!    │                  ▲                          │
//!    │                  └──────────reset───────────┘
//!    └──load fails──▶ Unavailable
//! ```
//!
//! The loaded snapshot is the baseline for every later filter. The session
//! also owns the chart canvas, so each render replaces the previous charts.

use std::sync::Arc;
use tracing::{info, warn};

use super::chart::ChartCanvas;
use super::filter::{filter_reviews, FilterState};
use super::render;
use super::source::SnapshotSource;
use super::summary::summarize;
use crate::models::{ClassifiedSnapshot, Review, Summary};

/// A summary plus the reviews it was computed over.
///
/// Cloning is cheap; the baseline view is shared, not copied, when the
/// session is reset.
#[derive(Debug, Clone)]
pub struct View {
    pub summary: Arc<Summary>,
    pub data: Arc<Vec<Review>>,
}

impl View {
    pub fn from_snapshot(snapshot: ClassifiedSnapshot) -> Self {
        Self {
            summary: Arc::new(snapshot.summary),
            data: Arc::new(snapshot.data),
        }
    }

    /// Whether both halves point at the same allocations as `other`.
    pub fn shares_with(&self, other: &View) -> bool {
        Arc::ptr_eq(&self.summary, &other.summary) && Arc::ptr_eq(&self.data, &other.data)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unloaded,
    /// The snapshot could not be loaded; the message says why.
    Unavailable(String),
    Loaded,
    Filtered,
}

#[derive(Debug)]
pub struct DashboardSession {
    state: SessionState,
    baseline: Option<View>,
    current: Option<View>,
    filter: FilterState,
    canvas: ChartCanvas,
}

impl Default for DashboardSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Unloaded,
            baseline: None,
            current: None,
            filter: FilterState::default(),
            canvas: ChartCanvas::new(),
        }
    }

    /// Load the classified snapshot from `source`.
    ///
    /// Returns `false` and moves to [`SessionState::Unavailable`] when the
    /// source fails; the session then renders only the placeholder.
    pub async fn load(&mut self, source: &dyn SnapshotSource) -> bool {
        match source.load().await {
            Ok(snapshot) => {
                self.load_snapshot(snapshot);
                true
            }
            Err(e) => {
                warn!(error = %e, "classified snapshot unavailable");
                self.baseline = None;
                self.current = None;
                self.state = SessionState::Unavailable(e.to_string());
                false
            }
        }
    }

    /// Install `snapshot` as the baseline and show it unfiltered.
    pub fn load_snapshot(&mut self, snapshot: ClassifiedSnapshot) {
        info!(reviews = snapshot.data.len(), "loaded classified snapshot");
        let view = View::from_snapshot(snapshot);
        self.current = Some(view.clone());
        self.baseline = Some(view);
        self.filter = FilterState::default();
        self.state = SessionState::Loaded;
    }

    /// Filter the baseline and recompute the summary from scratch.
    ///
    /// An empty filter is the same as [`reset`](Self::reset). Does nothing
    /// until a snapshot is loaded.
    pub fn apply_filters(&mut self, filter: FilterState) -> Option<&View> {
        if self.baseline.is_none() {
            return None;
        }
        if filter.is_empty() {
            self.reset();
            return self.current.as_ref();
        }

        let baseline = self.baseline.as_ref()?;
        let data = filter_reviews(&baseline.data, &filter);
        let summary = summarize(
            &data,
            baseline.summary.product_id.clone(),
            baseline.summary.fetched_at.clone(),
        );
        info!(kept = data.len(), of = baseline.data.len(), "applied filters");

        self.current = Some(View {
            summary: Arc::new(summary),
            data: Arc::new(data),
        });
        self.filter = filter;
        self.state = SessionState::Filtered;
        self.current.as_ref()
    }

    /// Clear the filter and show the baseline summary and data as-is.
    pub fn reset(&mut self) {
        self.filter = FilterState::default();
        if let Some(baseline) = &self.baseline {
            self.current = Some(baseline.clone());
            self.state = SessionState::Loaded;
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn view(&self) -> Option<&View> {
        self.current.as_ref()
    }

    pub fn baseline(&self) -> Option<&View> {
        self.baseline.as_ref()
    }

    pub fn canvas(&self) -> &ChartCanvas {
        &self.canvas
    }

    /// Render the full dashboard page for the current view, replacing any
    /// previously drawn charts. Without a loaded snapshot only the
    /// placeholder is rendered.
    pub fn render_html(&mut self) -> String {
        match &self.current {
            Some(view) => {
                self.canvas.draw(&view.summary);
                render::page(view, &self.filter, &self.canvas)
            }
            None => {
                self.canvas.clear();
                render::placeholder_page()
            }
        }
    }

    /// Render the current view as plain text, or the placeholder message.
    pub fn render_text(&self) -> String {
        match &self.current {
            Some(view) => render::text_report(view),
            None => format!("{}\n", render::PLACEHOLDER),
        }
    }
}
