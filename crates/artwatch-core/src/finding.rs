// crates/artwatch-core/src/finding.rs
//
// Finding (a.k.a. crawler result) and its status machine, plus the transient
// Candidate produced by reverse-image search.
//
// Status transitions are a plain overwrite:
//   pending -> read | verified | dismissed, and any of those -> any other.
// Setting the current status again is a no-op success.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ArtwatchError;

/// Bit length of the perceptual fingerprint. Hash distances live in `0..=HASH_BITS`.
pub const HASH_BITS: u32 = 64;

/// A candidate match returned by a search backend. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub url: String,
    pub title: Option<String>,
}

impl Candidate {
    pub fn new(url: impl Into<String>, title: Option<String>) -> Self {
        Self {
            url: url.into(),
            title,
        }
    }
}

/// Review status of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingStatus {
    /// Initial state, set at detection. Counts as unread.
    Pending,
    /// Seen by the owner.
    Read,
    /// Owner confirmed the infringement.
    Verified,
    /// Owner marked it a false positive.
    Dismissed,
}

impl FindingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingStatus::Pending => "pending",
            FindingStatus::Read => "read",
            FindingStatus::Verified => "verified",
            FindingStatus::Dismissed => "dismissed",
        }
    }
}

impl fmt::Display for FindingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FindingStatus {
    type Err = ArtwatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(FindingStatus::Pending),
            "read" => Ok(FindingStatus::Read),
            "verified" => Ok(FindingStatus::Verified),
            "dismissed" => Ok(FindingStatus::Dismissed),
            other => Err(ArtwatchError::Serialization(format!(
                "unknown finding status: {}",
                other
            ))),
        }
    }
}

/// A persisted record of one candidate whose similarity cleared the store threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Unique id: `{artwork_id}-{uuid v7}`, collision-free across concurrent detections.
    pub id: String,
    pub original_artwork_id: String,
    pub found_url: String,
    /// Always `1 - hash_distance / 64`.
    pub similarity_score: f64,
    /// Hamming distance between fingerprints, in `0..=64`.
    pub hash_distance: u32,
    pub tamper_detected: bool,
    /// Detection timestamp. Set once.
    pub detected_at: DateTime<Utc>,
    pub status: FindingStatus,
}

impl Finding {
    /// Build a new pending finding. The similarity score is derived from the
    /// distance so the two can never disagree.
    pub fn new(artwork_id: &str, found_url: &str, hash_distance: u32, tamper_detected: bool) -> Self {
        let hash_distance = hash_distance.min(HASH_BITS);
        Self {
            id: format!("{}-{}", artwork_id, Uuid::now_v7().simple()),
            original_artwork_id: artwork_id.to_string(),
            found_url: found_url.to_string(),
            similarity_score: similarity_from_distance(hash_distance),
            hash_distance,
            tamper_detected,
            detected_at: Utc::now(),
            status: FindingStatus::Pending,
        }
    }

    pub fn is_unread(&self) -> bool {
        self.status == FindingStatus::Pending
    }
}

/// `1 - d / 64`, clamped to the valid distance range.
pub fn similarity_from_distance(distance: u32) -> f64 {
    1.0 - f64::from(distance.min(HASH_BITS)) / f64::from(HASH_BITS)
}
