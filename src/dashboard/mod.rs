//! Dashboard pipeline: load → filter / reset → summarize → render.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`source`] | Load the classified snapshot from a file or a server |
//! | [`filter`] | Date-range and category filter, review date parsing |
//! | [`summary`] | Pure per-category / per-sentiment counting |
//! | [`session`] | Session state machine and view ownership |
//! | [`chart`] | SVG pie and bar charts with replace-on-redraw handles |
//! | [`render`] | HTML page and plain-text report |

pub mod chart;
pub mod filter;
pub mod render;
pub mod session;
pub mod source;
pub mod summary;

pub use filter::{filter_reviews, FilterState};
pub use session::{DashboardSession, SessionState, View};
pub use source::{FileSnapshotSource, HttpSnapshotSource, SnapshotSource};
pub use summary::summarize;
