//! Core data models for reviews, snapshots, and summaries.
//!
//! Raw reviews come straight from the search API and are written to the raw
//! snapshot. Classified reviews carry the `category` / `sentiment` labels
//! assigned by the external classifier. Labels are kept as strings on the
//! record because the classifier may emit values outside the fixed sets;
//! [`Category`] and [`Sentiment`] are used wherever a fixed order or a
//! closed set matters (aggregation, filter selection, rendering).

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Review content category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Crashes,
    Bugs,
    Complaints,
    Praises,
    Other,
}

impl Category {
    /// Fixed rendering order.
    pub const ALL: [Category; 5] = [
        Category::Crashes,
        Category::Bugs,
        Category::Complaints,
        Category::Praises,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Crashes => "Crashes",
            Category::Bugs => "Bugs",
            Category::Complaints => "Complaints",
            Category::Praises => "Praises",
            Category::Other => "Other",
        }
    }

    /// Exact, case-sensitive label match.
    pub fn from_label(label: &str) -> Option<Self> {
        Category::ALL.into_iter().find(|c| c.as_str() == label)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::from_label(s).ok_or_else(|| {
            format!(
                "unknown category '{}'. Expected one of: Crashes, Bugs, Complaints, Praises, Other",
                s
            )
        })
    }
}

/// Review tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    /// Fixed rendering order.
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    /// Wire label (lowercase).
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }

    /// Capitalised label used in the stat grid.
    pub fn title(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Neutral => "Neutral",
            Sentiment::Negative => "Negative",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Sentiment::ALL.into_iter().find(|s| s.as_str() == label)
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A review as returned by the search API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawReview {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Developer response, passed through in whatever shape the API uses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
}

/// The raw snapshot written by the fetcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSnapshot {
    pub product_id: String,
    /// RFC 3339 timestamp with millisecond precision.
    pub fetched_at: String,
    pub count: usize,
    pub reviews: Vec<RawReview>,
}

/// A classified review.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub rating: Option<Number>,
    /// Cleaned text written by the classifier.
    #[serde(default)]
    pub text: Option<String>,
    /// Review body as fetched, when the classifier passes it through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sentiment: Option<String>,
}

impl Review {
    /// Text to display: the classifier's `text`, else the raw `snippet`.
    pub fn body(&self) -> Option<&str> {
        self.text.as_deref().or(self.snippet.as_deref())
    }

    /// The category label if it names one of the fixed categories.
    pub fn known_category(&self) -> Option<Category> {
        self.category.as_deref().and_then(Category::from_label)
    }

    pub fn known_sentiment(&self) -> Option<Sentiment> {
        self.sentiment.as_deref().and_then(Sentiment::from_label)
    }
}

/// Aggregate counts over a review sequence.
///
/// The count maps are string-keyed so a summary written by the external
/// classifier, which may omit zero buckets or carry extra labels, loads
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub by_category: BTreeMap<String, u64>,
    #[serde(default)]
    pub by_sentiment: BTreeMap<String, u64>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub fetched_at: Option<String>,
}

impl Summary {
    /// Count for `category`, 0 when the bucket is absent.
    pub fn category_count(&self, category: Category) -> u64 {
        self.by_category
            .get(category.as_str())
            .copied()
            .unwrap_or(0)
    }

    /// Count for `sentiment`, 0 when the bucket is absent.
    pub fn sentiment_count(&self, sentiment: Sentiment) -> u64 {
        self.by_sentiment
            .get(sentiment.as_str())
            .copied()
            .unwrap_or(0)
    }
}

/// The classified snapshot served at `/classified-reviews`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedSnapshot {
    pub summary: Summary,
    #[serde(default)]
    pub data: Vec<Review>,
}
