//! Pure aggregation of a review sequence into a [`Summary`].
//!
//! Used for every filtered view; the loaded baseline keeps the summary the
//! classifier wrote.

use std::collections::BTreeMap;

use crate::models::{Category, Review, Sentiment, Summary};

/// Count reviews per category and per sentiment.
///
/// Every fixed bucket is present in the result, zero or not. A missing or
/// unrecognised category counts as `Other`; a missing or unrecognised
/// sentiment counts as `neutral`. `product_id` and `fetched_at` are passed
/// through untouched.
pub fn summarize(
    records: &[Review],
    product_id: Option<String>,
    fetched_at: Option<String>,
) -> Summary {
    let mut by_category: BTreeMap<String, u64> = Category::ALL
        .iter()
        .map(|c| (c.as_str().to_string(), 0))
        .collect();
    let mut by_sentiment: BTreeMap<String, u64> = Sentiment::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();

    for r in records {
        let category = r.known_category().unwrap_or(Category::Other);
        let sentiment = r.known_sentiment().unwrap_or(Sentiment::Neutral);
        *by_category.entry(category.as_str().to_string()).or_default() += 1;
        *by_sentiment
            .entry(sentiment.as_str().to_string())
            .or_default() += 1;
    }

    Summary {
        by_category,
        by_sentiment,
        total: records.len() as u64,
        product_id,
        fetched_at,
    }
}
