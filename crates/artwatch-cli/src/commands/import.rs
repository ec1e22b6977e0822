// crates/artwatch-cli/src/commands/import.rs
//
// `artwatch import <file.json>`: seed registered artworks through the daemon.
//
// The file holds a JSON array of `{id, owner_id, content_ref, content_kind?}`.
// Re-importing an id replaces the stored record.

use std::path::Path;

use artwatch_core::{Artwork, ArtwatchError};

use super::CliError;
use crate::rpc_client::DaemonClient;

/// Parse an artwork list from JSON text.
pub fn parse_artworks(contents: &str) -> Result<Vec<Artwork>, CliError> {
    let artworks: Vec<Artwork> = serde_json::from_str(contents).map_err(ArtwatchError::from)?;
    for artwork in &artworks {
        if artwork.id.trim().is_empty() || artwork.content_ref.trim().is_empty() {
            return Err(CliError::Usage(format!(
                "artwork entries need a non-empty id and content_ref (got id {:?})",
                artwork.id
            )));
        }
    }
    Ok(artworks)
}

pub async fn run(client: &DaemonClient, path: &Path) -> Result<String, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let artworks = parse_artworks(&contents)?;
    let result = client.import(artworks).await?;
    Ok(format!(
        "Imported {} artworks from {}",
        result.imported,
        path.display()
    ))
}
