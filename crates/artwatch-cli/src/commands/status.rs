// crates/artwatch-cli/src/commands/status.rs
//
// `artwatch status`: whether the daemon's scheduler is running and which
// search backends it queries.

use super::CliError;
use crate::output::{format_json, OutputFormat};
use crate::rpc_client::DaemonClient;

pub async fn run(client: &DaemonClient, format: OutputFormat) -> Result<String, CliError> {
    let status = client.status().await?;
    if format == OutputFormat::Json {
        return Ok(format_json(&status));
    }

    let backends = if status.backends.is_empty() {
        "none".to_string()
    } else {
        status.backends.join(", ")
    };
    Ok(format!(
        "Daemon: {}\n  Scheduler: {}\n  Backends:  {}",
        client.endpoint(),
        if status.running { "running" } else { "idle" },
        backends
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testutil::seeded_daemon;

    #[tokio::test]
    async fn reports_idle_scheduler_without_backends() {
        let (client, _) = seeded_daemon().await;
        let text = run(&client, OutputFormat::Table).await.unwrap();
        assert!(text.contains("Scheduler: idle"));
        assert!(text.contains("Backends:  none"));

        let json = run(&client, OutputFormat::Json).await.unwrap();
        assert!(json.contains("\"running\": false"));
    }
}
