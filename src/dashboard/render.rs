//! Projection of a [`View`] into HTML or plain text.
//!
//! Both renderers share the same pieces: the metadata block, the stat grid
//! in fixed order (five categories, then three sentiments, missing counts
//! shown as 0), and one table row per review in supplied order.

use std::fmt::Write;

use super::chart::ChartCanvas;
use super::filter::FilterState;
use super::session::View;
use serde_json::Number;

use crate::models::{Category, Review, Sentiment, Summary};

/// Shown instead of the dashboard when no classified snapshot is available.
pub const PLACEHOLDER: &str = "No data yet. Run `pulse run` (or fetch and classify) first.";

/// Escape `<` so review text cannot inject markup.
pub fn escape_markup(s: &str) -> String {
    s.replace('<', "&lt;")
}

/// `App` / `Fetched` / `Total classified` lines.
pub fn metadata_text(summary: &Summary) -> String {
    format!(
        "App: {}\nFetched: {}\nTotal classified: {}",
        summary.product_id.as_deref().unwrap_or("-"),
        summary.fetched_at.as_deref().unwrap_or("-"),
        summary.total
    )
}

/// Stat grid cells: Crashes, Bugs, Complaints, Praises, Other, Positive,
/// Neutral, Negative.
pub fn stat_grid(summary: &Summary) -> Vec<(&'static str, u64)> {
    let categories = Category::ALL
        .iter()
        .map(|&c| (c.as_str(), summary.category_count(c)));
    let sentiments = Sentiment::ALL
        .iter()
        .map(|&s| (s.title(), summary.sentiment_count(s)));
    categories.chain(sentiments).collect()
}

/// One table row, unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub rating: String,
    pub category: String,
    pub sentiment: String,
    pub text: String,
    pub date: String,
}

impl From<&Review> for TableRow {
    fn from(r: &Review) -> Self {
        Self {
            rating: r.rating.as_ref().map(format_rating).unwrap_or_default(),
            category: r.category.clone().unwrap_or_default(),
            sentiment: r.sentiment.clone().unwrap_or_default(),
            text: r.body().unwrap_or_default().to_string(),
            date: r.date.clone().unwrap_or_default(),
        }
    }
}

pub fn table_rows(data: &[Review]) -> Vec<TableRow> {
    data.iter().map(TableRow::from).collect()
}

/// Whole-number ratings print without a fractional part.
fn format_rating(rating: &Number) -> String {
    match rating.as_f64() {
        Some(f) if f.fract() == 0.0 && rating.is_f64() => format!("{}", f as i64),
        _ => rating.to_string(),
    }
}

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 2rem; color: #1f2933; }
pre#meta { background: #f5f7fa; padding: .75rem 1rem; border-radius: 6px; }
form.controls { display: flex; gap: 1rem; align-items: end; flex-wrap: wrap; margin-bottom: 1.5rem; }
form.controls label { display: flex; flex-direction: column; font-size: .85rem; gap: .25rem; }
#counts { display: grid; grid-template-columns: repeat(4, minmax(8rem, 1fr)); gap: .75rem; margin: 1rem 0; }
.stat { border: 1px solid #d9e2ec; border-radius: 6px; padding: .5rem .75rem; }
.stat h4 { margin: 0; font-size: .8rem; color: #52606d; }
.stat .num { font-size: 1.6rem; font-weight: 600; }
.charts { display: flex; gap: 2rem; flex-wrap: wrap; }
.charts figure { margin: 0; width: 360px; }
.chart text { font-size: 12px; fill: #334e68; }
table { border-collapse: collapse; width: 100%; margin-top: 1.5rem; }
th, td { border-bottom: 1px solid #e4e7eb; padding: .4rem .5rem; text-align: left; vertical-align: top; }
"#;

fn page_start(out: &mut String) {
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<title>Review Pulse</title>\n<style>");
    out.push_str(STYLE);
    out.push_str("</style>\n</head>\n<body>\n<h1>Review Pulse</h1>\n");
}

fn page_end(out: &mut String) {
    out.push_str("</body>\n</html>\n");
}

/// The page shown when the classified snapshot could not be loaded.
pub fn placeholder_page() -> String {
    let mut out = String::new();
    page_start(&mut out);
    let _ = writeln!(out, "<pre id=\"meta\">{}</pre>", escape_markup(PLACEHOLDER));
    page_end(&mut out);
    out
}

/// The full dashboard page. `canvas` must already hold the charts for
/// `view.summary`.
pub fn page(view: &View, filter: &FilterState, canvas: &ChartCanvas) -> String {
    let mut out = String::new();
    page_start(&mut out);

    controls(&mut out, filter);

    let _ = writeln!(
        out,
        "<pre id=\"meta\">{}</pre>",
        escape_markup(&metadata_text(&view.summary))
    );

    out.push_str("<div id=\"counts\">\n");
    for (label, n) in stat_grid(&view.summary) {
        let _ = writeln!(
            out,
            "<div class=\"stat\"><h4>{}</h4><div class=\"num\">{}</div></div>",
            label, n
        );
    }
    out.push_str("</div>\n");

    out.push_str("<div class=\"charts\">\n");
    if let Some(pie) = canvas.pie() {
        let _ = writeln!(
            out,
            "<figure id=\"categoryPie\"><figcaption>By category</figcaption>{}</figure>",
            pie.svg()
        );
    }
    if let Some(bar) = canvas.bar() {
        let _ = writeln!(
            out,
            "<figure id=\"sentimentBar\"><figcaption>By sentiment</figcaption>{}</figure>",
            bar.svg()
        );
    }
    out.push_str("</div>\n");

    out.push_str(
        "<table>\n<thead><tr><th>Rating</th><th>Category</th><th>Sentiment</th><th>Text</th><th>Date</th></tr></thead>\n<tbody id=\"rows\">\n",
    );
    for row in table_rows(&view.data) {
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            row.rating,
            escape_markup(&row.category),
            escape_markup(&row.sentiment),
            escape_markup(&row.text),
            escape_markup(&row.date)
        );
    }
    out.push_str("</tbody>\n</table>\n");

    page_end(&mut out);
    out
}

fn controls(out: &mut String, filter: &FilterState) {
    let date_value = |d: Option<chrono::NaiveDate>| {
        d.map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    };

    out.push_str("<form class=\"controls\" method=\"get\" action=\"/\">\n");
    let _ = writeln!(
        out,
        "<label>From<input type=\"date\" id=\"fromDate\" name=\"from\" value=\"{}\"></label>",
        date_value(filter.from_date)
    );
    let _ = writeln!(
        out,
        "<label>To<input type=\"date\" id=\"toDate\" name=\"to\" value=\"{}\"></label>",
        date_value(filter.to_date)
    );
    out.push_str("<label>Categories<select id=\"categorySelect\" name=\"category\" multiple size=\"5\">\n");
    for c in Category::ALL {
        let selected = if filter.categories.contains(&c) {
            " selected"
        } else {
            ""
        };
        let _ = writeln!(out, "<option value=\"{0}\"{1}>{0}</option>", c, selected);
    }
    out.push_str("</select></label>\n");
    out.push_str("<button type=\"submit\" id=\"applyBtn\">Apply</button>\n");
    out.push_str("<a id=\"resetBtn\" href=\"/\">Reset</a>\n");
    out.push_str("</form>\n");
}

/// Plain-text rendering for terminals: metadata, stat grid, and table.
pub fn text_report(view: &View) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", metadata_text(&view.summary));
    out.push('\n');

    for (label, n) in stat_grid(&view.summary) {
        let _ = writeln!(out, "  {:<12} {:>6}", label, n);
    }

    let rows = table_rows(&view.data);
    if rows.is_empty() {
        return out;
    }

    out.push('\n');
    let _ = writeln!(
        out,
        "  {:<6} {:<12} {:<10} {:<20} TEXT",
        "RATING", "CATEGORY", "SENTIMENT", "DATE"
    );
    let _ = writeln!(out, "  {}", "-".repeat(96));
    for row in rows {
        let _ = writeln!(
            out,
            "  {:<6} {:<12} {:<10} {:<20} {}",
            row.rating,
            row.category,
            row.sentiment,
            row.date,
            truncate_chars(&row.text.replace('\n', " "), 60)
        );
    }
    out
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut t: String = s.chars().take(max.saturating_sub(1)).collect();
    t.push('…');
    t
}
