// crates/artwatch-cli/src/commands/mark.rs
//
// `artwatch mark <finding-id> <status>`: overwrite a finding's review status.

use artwatch_core::FindingStatus;

use super::CliError;
use crate::rpc_client::DaemonClient;

pub async fn run(client: &DaemonClient, finding_id: &str, status: &str) -> Result<String, CliError> {
    let status: FindingStatus = status.parse()?;
    let marked = client.mark(finding_id, status).await?;
    Ok(format!("Finding {} marked {}", marked.finding_id, marked.status))
}
