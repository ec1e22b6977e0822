// crates/artwatch-cli/src/commands/notifications.rs
//
// `artwatch notifications <owner-id> [--clear]`: the daemon's in-memory
// notification list for one owner, with its unread count.

use serde::Serialize;

use artwatch_core::Finding;

use super::CliError;
use crate::output::{format_json, render_findings, OutputFormat};
use crate::rpc_client::DaemonClient;

#[derive(Serialize)]
struct NotificationsView<'a> {
    owner_id: &'a str,
    unread: usize,
    findings: &'a [Finding],
}

pub async fn run(
    client: &DaemonClient,
    owner_id: &str,
    clear: bool,
    format: OutputFormat,
) -> Result<String, CliError> {
    if clear {
        client.clear_notifications(owner_id).await?;
        return Ok(format!("Cleared notifications for {}", owner_id));
    }

    let listed = client.notifications(owner_id).await?;
    Ok(match format {
        OutputFormat::Json => format_json(&NotificationsView {
            owner_id,
            unread: listed.unread,
            findings: &listed.findings,
        }),
        OutputFormat::Table => format!(
            "{} unread of {} notifications for {}\n{}",
            listed.unread,
            listed.findings.len(),
            owner_id,
            render_findings(&listed.findings, OutputFormat::Table)
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testutil::seeded_daemon;

    #[tokio::test]
    async fn empty_cache_then_clear() {
        // Seeded findings were written straight to the store, so the
        // daemon has not notified anyone yet.
        let (client, _) = seeded_daemon().await;
        let text = run(&client, "alice", false, OutputFormat::Table).await.unwrap();
        assert!(text.starts_with("0 unread of 0 notifications for alice"));
        assert!(text.ends_with("No findings."));

        let json = run(&client, "alice", false, OutputFormat::Json).await.unwrap();
        assert!(json.contains("\"unread\": 0"));

        let cleared = run(&client, "alice", true, OutputFormat::Table).await.unwrap();
        assert_eq!(cleared, "Cleared notifications for alice");
        assert_eq!(client.notifications("alice").await.unwrap().unread, 0);
    }
}
