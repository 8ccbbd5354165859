//! Plain-text and JSON rendering of a dashboard snapshot.

use std::fmt::Write;

use ev_core::config::RangePolicy;
use ev_core::formatting::{format_count, format_range, format_share};
use ev_runtime::dashboard::DashboardSnapshot;
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

/// How reports are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// Anything other than `"json"` renders as text.
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("json") {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// A snapshot plus the ingestion outcome it was computed from.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    #[serde(flatten)]
    pub snapshot: DashboardSnapshot<'a>,
    /// Set when the records could not be loaded; the views are then empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingest_error: Option<String>,
}

impl Report<'_> {
    pub fn render(&self, format: OutputFormat, policy: &RangePolicy) -> anyhow::Result<String> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            OutputFormat::Text => Ok(self.render_text(policy)),
        }
    }

    fn render_text(&self, policy: &RangePolicy) -> String {
        let snap = &self.snapshot;
        let mut out = String::new();

        let _ = writeln!(out, "EV Analytics Dashboard");
        if let Some(reason) = &self.ingest_error {
            let _ = writeln!(out, "Ingestion failed: {reason}");
        }
        let scope = if snap.group == ev_core::models::ALL_GROUPS {
            String::new()
        } else {
            format!(" in {} County", snap.group)
        };
        let _ = writeln!(
            out,
            "Displaying {} records{scope}",
            format_count(snap.summary.total_vehicles as u64)
        );
        out.push('\n');

        let summary = &snap.summary;
        let mut cards = Table::new(&["Total Vehicles", "Avg Range", "Top Maker", "Latest Year"]);
        cards.push(vec![
            format_count(summary.total_vehicles as u64),
            format!("{} mi", summary.top_average_range.unwrap_or(0)),
            summary
                .top_manufacturer
                .clone()
                .unwrap_or_else(|| "N/A".to_string()),
            summary
                .latest_year
                .map(|y| y.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
        ]);
        cards.write_to(&mut out);

        section(&mut out, "Adoption Trends (By Year)");
        let mut trend = Table::new(&["Year", "Count"]).right(1);
        for point in &snap.views.trend {
            trend.push(vec![point.period.to_string(), format_count(point.count)]);
        }
        trend.write_to(&mut out);

        section(&mut out, "Market Share");
        let classified: u64 = snap.views.distribution.iter().map(|s| s.count).sum();
        let mut share = Table::new(&["Type", "Count", "Share"]).right(1).right(2);
        for slice in &snap.views.distribution {
            share.push(vec![
                slice.label.clone(),
                format_count(slice.count),
                format_share(slice.count, classified),
            ]);
        }
        share.write_to(&mut out);

        section(&mut out, "Top Brands by Average Range (Miles)");
        let mut ranked = Table::new(&["Make", "Avg Range"]).right(1);
        for entry in &snap.views.ranked {
            ranked.push(vec![entry.label.clone(), entry.average_range.to_string()]);
        }
        ranked.write_to(&mut out);

        section(&mut out, "Vehicle Registrations");
        let page = &snap.page;
        if page.rows.is_empty() {
            let _ = writeln!(out, "No data available for this selection.");
        } else {
            let mut listing =
                Table::new(&["VIN", "Make", "Model", "Year", "City", "Range (mi)"]).right(5);
            for record in &page.rows {
                listing.push(vec![
                    cell(&record.vin),
                    cell(&record.make),
                    cell(&record.model),
                    cell(&record.model_year),
                    cell(&record.city),
                    format_range(
                        record.electric_range(policy),
                        record.electric_range.as_deref(),
                    ),
                ]);
            }
            listing.write_to(&mut out);
        }
        let _ = writeln!(
            out,
            "Page {} of {}",
            page.current_page, page.total_pages
        );

        out
    }
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{title}");
    let _ = writeln!(out, "{}", "=".repeat(title.width()));
}

fn cell(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

// ── Table ─────────────────────────────────────────────────────────────────────

/// Column-aligned text table measured in display width.
struct Table {
    headers: Vec<String>,
    right_aligned: Vec<bool>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            right_aligned: vec![false; headers.len()],
            rows: Vec::new(),
        }
    }

    fn right(mut self, column: usize) -> Self {
        self.right_aligned[column] = true;
        self
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn write_to(&self, out: &mut String) {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.width()).collect();
        for row in &self.rows {
            for (w, value) in widths.iter_mut().zip(row) {
                *w = (*w).max(value.width());
            }
        }

        self.write_row(out, &self.headers, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        self.write_row(out, &rule, &widths);
        for row in &self.rows {
            self.write_row(out, row, &widths);
        }
    }

    fn write_row(&self, out: &mut String, row: &[String], widths: &[usize]) {
        let cells: Vec<String> = row
            .iter()
            .zip(widths)
            .zip(&self.right_aligned)
            .map(|((value, width), right)| {
                let fill = " ".repeat(width.saturating_sub(value.width()));
                if *right {
                    format!("{fill}{value}")
                } else {
                    format!("{value}{fill}")
                }
            })
            .collect();
        let _ = writeln!(out, "{}", cells.join("  ").trim_end());
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
