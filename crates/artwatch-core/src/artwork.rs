// crates/artwatch-core/src/artwork.rs

use serde::{Deserialize, Serialize};

/// A registered artwork. Owned by the registration subsystem; the crawler
/// only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artwork {
    /// Unique artwork identifier.
    pub id: String,
    /// Identifier of the creator who registered the artwork.
    pub owner_id: String,
    /// Content reference, typically an IPFS CID.
    pub content_ref: String,
    /// Content-kind tag (e.g. "image/png").
    #[serde(default = "default_content_kind")]
    pub content_kind: String,
}

fn default_content_kind() -> String {
    "image".to_string()
}

impl Artwork {
    pub fn new(id: &str, owner_id: &str, content_ref: &str) -> Self {
        Self {
            id: id.to_string(),
            owner_id: owner_id.to_string(),
            content_ref: content_ref.to_string(),
            content_kind: default_content_kind(),
        }
    }
}
