//! Reporting utilities for analysis results.
//!
//! Provides formatted console output plus CSV and JSON export.

use crate::application::analysis_service::{AnalysisReport, SourceReport, TickerReport};
use crate::domain::items::SourceKind;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// One classified item, flattened for tabular export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemRow {
    pub ticker: String,
    pub source: String,
    pub title: String,
    pub link: String,
    pub label: String,
    pub confidence: f64,
    pub published: String,
    pub community: String,
}

/// Reporter for analysis results output.
pub struct SentimentReporter {
    verbose: bool,
}

impl SentimentReporter {
    /// `verbose` adds one line per classified item to the console output.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn print_report(&self, report: &AnalysisReport) {
        print!("{}", self.render(report));
    }

    pub fn render(&self, report: &AnalysisReport) -> String {
        let mut out = String::new();
        for ticker in &report.tickers {
            out.push_str(&self.render_ticker(ticker));
        }
        out.push_str(&render_summary_table(report));
        out
    }

    pub fn render_ticker(&self, ticker: &TickerReport) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\n===== {} =====", ticker.ticker());
        for source in [SourceKind::News, SourceKind::Forum] {
            out.push_str(&self.render_source(ticker.source(source)));
        }
        out
    }

    fn render_source(&self, report: &SourceReport) -> String {
        let mut out = String::new();
        let result = &report.result;

        if self.verbose {
            for item in &result.items {
                let _ = writeln!(out, "Title: {}", item.item.title);
                let _ = writeln!(
                    out,
                    "Link: {}",
                    item.item.link.as_deref().unwrap_or("N/A")
                );
                if let Some(published) = item.item.published {
                    let _ = writeln!(out, "Published: {}", published.format("%Y-%m-%d %H:%M UTC"));
                }
                let _ = writeln!(
                    out,
                    "Sentiment: {}, Score: {:.4}",
                    item.label(),
                    item.confidence()
                );
                let _ = writeln!(out, "{}", "-".repeat(40));
            }
        }

        for warning in &report.warnings {
            let _ = writeln!(out, "⚠️  {}", warning);
        }

        if result.has_analyzed_items() {
            let _ = writeln!(
                out,
                "\n{} Sentiment: {} ({:.4})",
                report.source, result.verdict, result.final_score
            );
            let noun = capitalize(report.source.item_noun());
            let _ = writeln!(out, "Total Positive {}: {}", noun, result.positive_count);
            let _ = writeln!(out, "Total Negative {}: {}", noun, result.negative_count);
        } else {
            let _ = writeln!(
                out,
                "\n{}: No matching {} found for sentiment analysis.",
                report.source,
                report.source.item_noun()
            );
        }
        out
    }

    /// Writes every classified item as CSV. Returns the number of rows written.
    pub fn export_csv(&self, report: &AnalysisReport, path: &Path) -> Result<usize> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let rows = write_items_csv(report, file)?;
        println!("💾 {} items written to {}", rows, path.display());
        Ok(rows)
    }

    pub fn export_json(&self, report: &AnalysisReport, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(file, report).context("Failed to serialize report")?;
        println!("💾 Report written to {}", path.display());
        Ok(())
    }
}

/// Fixed-width table of both source scores per ticker.
pub fn render_summary_table(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", "=".repeat(64));
    let _ = writeln!(
        out,
        "{:<8} | {:>10} | {:<8} | {:>10} | {:<8}",
        "Ticker", "Reddit", "Verdict", "Yahoo", "Verdict"
    );
    let _ = writeln!(out, "{}", "-".repeat(64));
    for ticker in &report.tickers {
        let _ = writeln!(
            out,
            "{:<8} | {:>10.4} | {:<8} | {:>10.4} | {:<8}",
            ticker.ticker(),
            ticker.forum.result.final_score,
            ticker.forum.result.verdict.to_string(),
            ticker.news.result.final_score,
            ticker.news.result.verdict.to_string()
        );
    }
    let _ = writeln!(out, "{}", "=".repeat(64));
    out
}

pub fn item_rows(report: &AnalysisReport) -> Vec<ItemRow> {
    let mut rows = Vec::new();
    for ticker in &report.tickers {
        for source in [&ticker.news, &ticker.forum] {
            for classified in &source.result.items {
                let item = &classified.item;
                rows.push(ItemRow {
                    ticker: ticker.ticker().to_string(),
                    source: source.source.display_name().to_string(),
                    title: item.title.clone(),
                    link: item.link.clone().unwrap_or_default(),
                    label: classified.label().to_string(),
                    confidence: classified.confidence(),
                    published: item.published.map(|p| p.to_rfc3339()).unwrap_or_default(),
                    community: item.community.clone().unwrap_or_default(),
                });
            }
        }
    }
    rows
}

pub fn write_items_csv<W: Write>(report: &AnalysisReport, writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let rows = item_rows(report);
    for row in &rows {
        csv_writer.serialize(row).context("Failed to write CSV row")?;
    }
    csv_writer.flush().context("Failed to flush CSV output")?;
    Ok(rows.len())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
