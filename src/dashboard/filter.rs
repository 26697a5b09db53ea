//! Date-range and category filtering.
//!
//! A review passes when both hold:
//!
//! - no date bound is set, **or** its date parses and the calendar day lies
//!   in `[from, to]` (either bound may be open);
//! - no category is selected, **or** its category label is one of the
//!   selected categories.
//!
//! A review whose date does not parse is dropped while any date bound is
//! active and kept otherwise.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use std::collections::BTreeSet;

use crate::models::{Category, Review};

/// Transient filter inputs for one dashboard session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub categories: BTreeSet<Category>,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        !self.has_date_bound() && self.categories.is_empty()
    }

    pub fn has_date_bound(&self) -> bool {
        self.from_date.is_some() || self.to_date.is_some()
    }

    pub fn matches(&self, review: &Review) -> bool {
        if self.has_date_bound() {
            let day = match review.date.as_deref().and_then(parse_review_date) {
                Some(dt) => dt.date(),
                None => return false,
            };
            if self.from_date.is_some_and(|from| day < from) {
                return false;
            }
            if self.to_date.is_some_and(|to| day > to) {
                return false;
            }
        }

        if !self.categories.is_empty() {
            match review.known_category() {
                Some(c) if self.categories.contains(&c) => {}
                _ => return false,
            }
        }

        true
    }
}

/// Keep the reviews matching `filter`, preserving order.
pub fn filter_reviews(reviews: &[Review], filter: &FilterState) -> Vec<Review> {
    reviews
        .iter()
        .filter(|r| filter.matches(r))
        .cloned()
        .collect()
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%m/%d/%Y"];

/// Parse a source-provided review date into local wall-clock time.
///
/// Timestamps with an offset are converted to local time. Forms without a
/// time of day are local midnight.
pub fn parse_review_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).naive_local());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .map(|d| d.and_time(chrono::NaiveTime::MIN))
}

/// Parse a `YYYY-MM-DD` filter bound. Blank input means "unset".
pub fn parse_bound(s: &str) -> Result<Option<NaiveDate>, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| format!("invalid date '{}': expected YYYY-MM-DD", s))
}

/// Build a filter from decoded query pairs such as
/// `[("from", "2024-01-01"), ("to", ""), ("category", "Bugs"), ("category", "Crashes")]`.
///
/// Repeated `category` keys accumulate; unknown keys are ignored.
pub fn filter_from_pairs<K, V>(pairs: &[(K, V)]) -> Result<FilterState, String>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut filter = FilterState::default();

    for (key, value) in pairs {
        let value = value.as_ref().trim();
        match key.as_ref() {
            "from" => filter.from_date = parse_bound(value)?,
            "to" => filter.to_date = parse_bound(value)?,
            "category" if !value.is_empty() => {
                filter.categories.insert(value.parse::<Category>()?);
            }
            _ => {}
        }
    }

    Ok(filter)
}
