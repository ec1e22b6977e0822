// crates/artwatch-cli/src/output.rs
//
// Output formatting utilities for the artwatch CLI.
// Supports table and JSON output modes.

use serde::Serialize;
use tabled::{Table, Tabled};

use artwatch_core::Finding;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed table output (default).
    Table,
    /// JSON output for machine consumption.
    Json,
}

impl OutputFormat {
    pub fn from_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        }
    }
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

/// One table row per finding.
#[derive(Debug, Tabled)]
pub struct FindingRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Artwork")]
    pub artwork: String,
    #[tabled(rename = "Similarity")]
    pub similarity: String,
    #[tabled(rename = "Dist")]
    pub distance: u32,
    #[tabled(rename = "Tampered")]
    pub tampered: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Detected")]
    pub detected: String,
    #[tabled(rename = "URL")]
    pub url: String,
}

impl From<&Finding> for FindingRow {
    fn from(f: &Finding) -> Self {
        Self {
            id: f.id.clone(),
            artwork: f.original_artwork_id.clone(),
            similarity: format!("{:.1}%", f.similarity_score * 100.0),
            distance: f.hash_distance,
            tampered: if f.tamper_detected { "yes" } else { "no" }.to_string(),
            status: f.status.to_string(),
            detected: f.detected_at.format("%Y-%m-%d %H:%M").to_string(),
            url: truncate(&f.found_url, 60),
        }
    }
}

/// Render findings in the requested format.
pub fn render_findings(findings: &[Finding], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => format_json(&findings),
        OutputFormat::Table if findings.is_empty() => "No findings.".to_string(),
        OutputFormat::Table => {
            let rows: Vec<FindingRow> = findings.iter().map(FindingRow::from).collect();
            format_table(&rows)
        }
    }
}

/// Truncate a string to the given maximum length in characters, appending
/// "..." if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let cut: String = s.chars().take(max_len).collect();
        format!("{}...", cut)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finding_row_formats_fields() {
        let finding = Finding::new("art-1", "https://copy.example/a.png", 3, true);
        let row = FindingRow::from(&finding);
        assert_eq!(row.similarity, "95.3%");
        assert_eq!(row.tampered, "yes");
        assert_eq!(row.status, "pending");
    }

    #[test]
    fn table_and_json_render() {
        let findings = vec![Finding::new("art-1", "https://copy.example/a.png", 0, false)];
        let table = render_findings(&findings, OutputFormat::Table);
        assert!(table.contains("Similarity"));
        assert!(table.contains("100.0%"));

        let json = render_findings(&findings, OutputFormat::Json);
        assert!(json.contains("\"original_artwork_id\": \"art-1\""));

        assert_eq!(render_findings(&[], OutputFormat::Table), "No findings.");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééé", 2), "éé...");
    }
}
