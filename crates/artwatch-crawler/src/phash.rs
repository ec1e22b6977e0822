// crates/artwatch-crawler/src/phash.rs
//
// Perceptual hashing of images.
//
// A 64-bit DCT-based fingerprint (pHash): the image is reduced to grayscale,
// transformed with a DCT, and each low-frequency coefficient is compared to
// the mean. Visually similar images produce fingerprints a small Hamming
// distance apart, even after recompression or resizing.

use std::fmt;

use image::DynamicImage;
use image_hasher::{HashAlg, HasherConfig};
use serde::{Deserialize, Serialize};

use artwatch_core::{similarity_from_distance, ArtwatchError, HASH_BITS};

/// A 64-bit perceptual fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PerceptualHash(pub u64);

impl PerceptualHash {
    /// Hamming distance to `other`, in `0..=64`.
    pub fn distance(&self, other: &PerceptualHash) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    pub fn to_hex(&self) -> String {
        format!("{:016x}", self.0)
    }

    pub fn from_hex(hex: &str) -> Result<Self, ArtwatchError> {
        u64::from_str_radix(hex.trim(), 16)
            .map(PerceptualHash)
            .map_err(|e| ArtwatchError::Decode(format!("invalid perceptual hash '{}': {}", hex, e)))
    }
}

impl fmt::Display for PerceptualHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Computes `PerceptualHash` values from encoded or decoded images.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerceptualHasher;

impl PerceptualHasher {
    pub fn new() -> Self {
        Self
    }

    /// Decode `data` (PNG, JPEG, GIF, WebP, ...) and fingerprint it.
    pub fn hash_bytes(&self, data: &[u8]) -> Result<PerceptualHash, ArtwatchError> {
        let image = image::load_from_memory(data)
            .map_err(|e| ArtwatchError::Decode(format!("failed to decode image: {}", e)))?;
        self.hash_image(&image)
    }

    /// Fingerprint an already-decoded image.
    pub fn hash_image(&self, image: &DynamicImage) -> Result<PerceptualHash, ArtwatchError> {
        let hasher = HasherConfig::new()
            .hash_alg(HashAlg::Mean)
            .preproc_dct()
            .hash_size(8, 8)
            .to_hasher();

        let hash = hasher.hash_image(image);
        let bytes: [u8; 8] = hash.as_bytes().try_into().map_err(|_| {
            ArtwatchError::Decode(format!(
                "expected a {}-bit hash, got {} bytes",
                HASH_BITS,
                hash.as_bytes().len()
            ))
        })?;

        Ok(PerceptualHash(u64::from_be_bytes(bytes)))
    }
}

/// Similarity of two fingerprints: `1 - distance / 64`.
pub fn compare_hashes(a: &PerceptualHash, b: &PerceptualHash) -> f64 {
    similarity_from_distance(a.distance(b))
}
