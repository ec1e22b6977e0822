// crates/artwatch-cli/src/commands/scan.rs
//
// `artwatch scan <ids...>`: run an on-demand batch scan.
//
// The daemon runs the batch. Failed ids are listed in the error; the command
// fails when any did.

use tabled::Tabled;

use artwatch_crawler::BatchSummary;

use super::CliError;
use crate::output::{format_json, format_table, OutputFormat};
use crate::rpc_client::DaemonClient;

#[derive(Debug, Tabled)]
struct ScanRow {
    #[tabled(rename = "Artwork")]
    artwork: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Candidates")]
    candidates: usize,
    #[tabled(rename = "Findings")]
    findings: usize,
    #[tabled(rename = "Alerts")]
    alerts: usize,
}

fn rows(summary: &BatchSummary) -> Vec<ScanRow> {
    summary
        .outcomes
        .iter()
        .map(|o| ScanRow {
            artwork: o.artwork_id.clone(),
            result: "ok".to_string(),
            candidates: o.candidates,
            findings: o.findings.len(),
            alerts: o.alerts,
        })
        .collect()
}

pub async fn run(client: &DaemonClient, ids: &[String], format: OutputFormat) -> Result<String, CliError> {
    if ids.is_empty() {
        return Err(CliError::Usage("scan needs at least one artwork id".to_string()));
    }

    let summary = client.scan(ids).await?;
    Ok(match format {
        OutputFormat::Json => format_json(&summary),
        OutputFormat::Table => format!(
            "{}\nScanned {} artworks: {} findings, {} alerts",
            format_table(&rows(&summary)),
            summary.total,
            summary.findings_stored,
            summary.alerts
        ),
    })
}
