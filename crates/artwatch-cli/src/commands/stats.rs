// crates/artwatch-cli/src/commands/stats.rs
//
// `artwatch stats <owner-id>`: finding counts for one owner.

use tabled::Tabled;

use super::CliError;
use crate::output::{format_json, format_table, OutputFormat};
use crate::rpc_client::DaemonClient;

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Count")]
    count: usize,
}

pub async fn run(client: &DaemonClient, owner_id: &str, format: OutputFormat) -> Result<String, CliError> {
    let stats = client.stats(owner_id).await?;
    if format == OutputFormat::Json {
        return Ok(format_json(&stats));
    }

    let rows = [
        ("total", stats.total_findings),
        ("pending", stats.by_status.pending),
        ("read", stats.by_status.read),
        ("verified", stats.by_status.verified),
        ("dismissed", stats.by_status.dismissed),
        ("high similarity", stats.by_similarity.high),
        ("medium similarity", stats.by_similarity.medium),
        ("low similarity", stats.by_similarity.low),
        ("tampered", stats.tampered),
        ("last 7 days", stats.recent_findings),
    ]
    .map(|(metric, count)| StatRow { metric, count });

    Ok(format!("Stats for {}\n{}", owner_id, format_table(&rows)))
}
