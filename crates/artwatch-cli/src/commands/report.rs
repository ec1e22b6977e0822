// crates/artwatch-cli/src/commands/report.rs
//
// `artwatch report <artwork-id>`: infringement report grouped by similarity.

use super::CliError;
use crate::output::{format_json, render_findings, OutputFormat};
use crate::rpc_client::DaemonClient;

pub async fn run(client: &DaemonClient, artwork_id: &str, format: OutputFormat) -> Result<String, CliError> {
    let report = client.report(artwork_id).await?;
    if format == OutputFormat::Json {
        return Ok(format_json(&report));
    }

    let mut out = format!(
        "Infringement report for {} ({} findings, generated {})\n",
        report.artwork_id,
        report.total_findings,
        report.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    for (label, findings) in [
        ("High similarity (>= 90%)", &report.high_similarity),
        ("Medium similarity (70-90%)", &report.medium_similarity),
        ("Low similarity (< 70%)", &report.low_similarity),
    ] {
        out.push_str(&format!("\n{}: {}\n", label, findings.len()));
        if !findings.is_empty() {
            out.push_str(&render_findings(findings, OutputFormat::Table));
            out.push('\n');
        }
    }
    Ok(out)
}
