// Report generation from crawl results

use anyhow::{Context, Result};
use chrono::Local;
use relcrawl_scanner::{CrawlSummary, MetadataRecord};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
    Csv,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "csv" => Some(ReportFormat::Csv),
            _ => None,
        }
    }
}

pub fn render_report(summary: &CrawlSummary, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(generate_crawl_report(summary)),
        ReportFormat::Json => generate_json_report(&summary.records),
        ReportFormat::Csv => Ok(generate_csv_report(&summary.records)),
    }
}

/// Human readable report. Records appear in collection order.
pub fn generate_crawl_report(summary: &CrawlSummary) -> String {
    let records = &summary.records;
    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str(&format!(
        "# Summary ({})\n",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    report.push_str(&format!("  Videos visited: {}\n", summary.visited));
    report.push_str(&format!("  Records collected: {}\n", records.len()));
    report.push_str(&format!("  Failed fetches: {}\n", summary.failed));

    let total_views: u64 = records.iter().map(|r| r.view_count).sum();
    report.push_str(&format!("  Total views: {}\n", total_views));

    let total_likes: u64 = records.iter().map(|r| r.like_count).sum();
    report.push_str(&format!("  Total likes: {}\n", total_likes));

    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    for (idx, record) in records.iter().enumerate() {
        report.push_str(&format!("{:>3}. {}\n", idx + 1, record.title));
        report.push_str(&format!("     {}\n", record.id));

        let mut line = format!(
            "     views {}  likes {}",
            record.view_count, record.like_count
        );
        if let Some(dislikes) = record.dislike_count {
            line.push_str(&format!("  dislikes {}", dislikes));
        }
        if let Some(ref category) = record.category {
            line.push_str(&format!("  [{}]", category));
        }
        report.push_str(&line);
        report.push_str("\n\n");
    }

    report
}

pub fn generate_json_report(records: &[MetadataRecord]) -> Result<String> {
    serde_json::to_string_pretty(records).context("Failed to serialize records")
}

pub fn generate_csv_report(records: &[MetadataRecord]) -> String {
    let mut csv = String::from("id,title,views,likes,dislikes,category\n");
    for record in records {
        let dislikes = record
            .dislike_count
            .map(|d| d.to_string())
            .unwrap_or_default();
        csv.push_str(&format!(
            "{},{},{},{},{},{}\n",
            escape_csv(record.id.as_str()),
            escape_csv(&record.title),
            record.view_count,
            record.like_count,
            dislikes,
            escape_csv(record.category.as_deref().unwrap_or("")),
        ));
    }
    csv
}

fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

pub fn write_report(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write report to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
