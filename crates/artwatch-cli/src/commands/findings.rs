// crates/artwatch-cli/src/commands/findings.rs
//
// `artwatch findings --owner <id> | --artwork <id>`: list stored findings.

use artwatch_daemon::control::FindingListParams;

use super::CliError;
use crate::output::{render_findings, OutputFormat};
use crate::rpc_client::DaemonClient;

pub async fn run(
    client: &DaemonClient,
    owner: Option<&str>,
    artwork: Option<&str>,
    format: OutputFormat,
) -> Result<String, CliError> {
    if owner.is_some() == artwork.is_some() {
        return Err(CliError::Usage(
            "pass exactly one of --owner or --artwork".to_string(),
        ));
    }
    let params = FindingListParams {
        owner_id: owner.map(str::to_string),
        artwork_id: artwork.map(str::to_string),
    };
    let findings = client.findings(params).await?;
    Ok(render_findings(&findings, format))
}
