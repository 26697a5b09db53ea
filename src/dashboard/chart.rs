//! Server-side SVG charts.
//!
//! A [`ChartCanvas`] owns at most one pie chart (categories) and one bar
//! chart (sentiments). Drawing a new summary releases the previous chart in
//! each slot before the replacement is stored, so charts never accumulate
//! across re-renders.

use std::f64::consts::PI;
use std::fmt::Write;
use tracing::debug;

use crate::models::{Category, Sentiment, Summary};

const PIE_COLORS: [&str; 5] = ["#d1495b", "#edae49", "#00798c", "#30a64a", "#8d99ae"];
const BAR_COLOR: &str = "#3d5a80";
const EMPTY_COLOR: &str = "#e5e7eb";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Pie,
    Bar,
}

/// A rendered chart handle.
#[derive(Debug)]
pub struct Chart {
    id: u64,
    kind: ChartKind,
    labels: Vec<&'static str>,
    values: Vec<u64>,
    svg: String,
}

impl Chart {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    pub fn labels(&self) -> &[&'static str] {
        &self.labels
    }

    pub fn values(&self) -> &[u64] {
        &self.values
    }

    pub fn svg(&self) -> &str {
        &self.svg
    }

    fn destroy(self) {
        debug!(id = self.id, kind = ?self.kind, "releasing chart");
    }
}

#[derive(Debug, Default)]
pub struct ChartCanvas {
    next_id: u64,
    pie: Option<Chart>,
    bar: Option<Chart>,
    released: u64,
}

impl ChartCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw both charts for `summary`, replacing whatever was drawn before.
    pub fn draw(&mut self, summary: &Summary) {
        let labels: Vec<&'static str> = Category::ALL.iter().map(|c| c.as_str()).collect();
        let values: Vec<u64> = Category::ALL
            .iter()
            .map(|&c| summary.category_count(c))
            .collect();
        let svg = pie_svg(&labels, &values);
        let pie = self.make(ChartKind::Pie, labels, values, svg);
        self.released += release(&mut self.pie);
        self.pie = Some(pie);

        let labels: Vec<&'static str> = Sentiment::ALL.iter().map(|s| s.as_str()).collect();
        let values: Vec<u64> = Sentiment::ALL
            .iter()
            .map(|&s| summary.sentiment_count(s))
            .collect();
        let svg = bar_svg(&labels, &values);
        let bar = self.make(ChartKind::Bar, labels, values, svg);
        self.released += release(&mut self.bar);
        self.bar = Some(bar);
    }

    /// Release both charts.
    pub fn clear(&mut self) {
        self.released += release(&mut self.pie) + release(&mut self.bar);
    }

    pub fn pie(&self) -> Option<&Chart> {
        self.pie.as_ref()
    }

    pub fn bar(&self) -> Option<&Chart> {
        self.bar.as_ref()
    }

    /// Number of charts currently held.
    pub fn live(&self) -> usize {
        self.pie.is_some() as usize + self.bar.is_some() as usize
    }

    /// Number of charts released since the canvas was created.
    pub fn released(&self) -> u64 {
        self.released
    }

    fn make(
        &mut self,
        kind: ChartKind,
        labels: Vec<&'static str>,
        values: Vec<u64>,
        svg: String,
    ) -> Chart {
        self.next_id += 1;
        Chart {
            id: self.next_id,
            kind,
            labels,
            values,
            svg,
        }
    }
}

fn release(slot: &mut Option<Chart>) -> u64 {
    match slot.take() {
        Some(old) => {
            old.destroy();
            1
        }
        None => 0,
    }
}

/// Y-axis ticks for a bar chart: zero-based, integer steps, topping out at
/// or above `max`.
pub fn bar_ticks(max: u64) -> Vec<u64> {
    if max == 0 {
        return vec![0, 1];
    }
    let step = max.div_ceil(5).max(1);
    let top = max.div_ceil(step) * step;
    (0..=top).step_by(step as usize).collect()
}

fn pie_svg(labels: &[&str], values: &[u64]) -> String {
    let (cx, cy, r) = (160.0_f64, 140.0_f64, 120.0_f64);
    let total: u64 = values.iter().sum();
    let mut svg = String::new();

    let _ = write!(
        svg,
        r#"<svg class="chart pie" viewBox="0 0 320 {h}" role="img" aria-label="Reviews by category">"#,
        h = 300 + 20 * labels.len()
    );

    if total == 0 {
        let _ = write!(
            svg,
            r#"<circle cx="{cx}" cy="{cy}" r="{r}" fill="{EMPTY_COLOR}"/>"#
        );
    } else {
        let mut angle = 0.0_f64;
        for (i, (&label, &value)) in labels.iter().zip(values).enumerate() {
            if value == 0 {
                continue;
            }
            let color = PIE_COLORS[i % PIE_COLORS.len()];
            if value == total {
                let _ = write!(
                    svg,
                    r#"<circle cx="{cx}" cy="{cy}" r="{r}" fill="{color}"><title>{label}: {value}</title></circle>"#
                );
                break;
            }
            let sweep = value as f64 / total as f64 * 2.0 * PI;
            let (x0, y0) = (cx + r * angle.sin(), cy - r * angle.cos());
            let end = angle + sweep;
            let (x1, y1) = (cx + r * end.sin(), cy - r * end.cos());
            let large = if sweep > PI { 1 } else { 0 };
            let _ = write!(
                svg,
                r#"<path d="M{cx:.2},{cy:.2} L{x0:.2},{y0:.2} A{r:.2},{r:.2} 0 {large} 1 {x1:.2},{y1:.2} Z" fill="{color}"><title>{label}: {value}</title></path>"#
            );
            angle = end;
        }
    }

    // Legend below the pie.
    for (i, (&label, &value)) in labels.iter().zip(values).enumerate() {
        let y = 290 + 20 * i;
        let color = PIE_COLORS[i % PIE_COLORS.len()];
        let _ = write!(
            svg,
            r#"<rect x="100" y="{ry}" width="12" height="12" fill="{color}"/><text x="118" y="{ty}">{label} ({value})</text>"#,
            ry = y - 10,
            ty = y
        );
    }

    svg.push_str("</svg>");
    svg
}

fn bar_svg(labels: &[&str], values: &[u64]) -> String {
    let (left, top, width, height) = (40.0_f64, 10.0_f64, 300.0_f64, 220.0_f64);
    let ticks = bar_ticks(values.iter().copied().max().unwrap_or(0));
    let y_max = *ticks.last().unwrap_or(&1) as f64;
    let y_of = |v: f64| top + height - v / y_max * height;

    let mut svg = String::new();
    svg.push_str(
        r#"<svg class="chart bar" viewBox="0 0 360 260" role="img" aria-label="Reviews by sentiment">"#,
    );

    for &t in &ticks {
        let y = y_of(t as f64);
        let _ = write!(
            svg,
            r##"<line x1="{left}" y1="{y:.2}" x2="{x2}" y2="{y:.2}" stroke="#d0d4da"/><text x="{tx}" y="{ty:.2}" text-anchor="end">{t}</text>"##,
            x2 = left + width,
            tx = left - 6.0,
            ty = y + 4.0
        );
    }

    let band = width / labels.len().max(1) as f64;
    for (i, (&label, &value)) in labels.iter().zip(values).enumerate() {
        let x = left + band * i as f64 + band * 0.2;
        let y = y_of(value as f64);
        let _ = write!(
            svg,
            r#"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="{BAR_COLOR}"><title>{label}: {value}</title></rect><text x="{lx:.2}" y="{ly}" text-anchor="middle">{label}</text>"#,
            w = band * 0.6,
            h = top + height - y,
            lx = x + band * 0.3,
            ly = top + height + 18.0
        );
    }

    svg.push_str("</svg>");
    svg
}
