// crates/artwatch-crawler/src/scoring.rs
//
// SimilarityScorer: turns a baseline fingerprint and a candidate image into a
// similarity score and a tamper verdict.
//
//   similarity = 1 - d / 64
//   tampered   = similarity > tamper_floor && d > 0
//
// A candidate that cannot be decoded or hashed yields no score at all, so it
// can never pass a store threshold, however low.

use serde::Serialize;

use artwatch_core::{similarity_from_distance, HASH_BITS};

use crate::config::DEFAULT_TAMPER_SIMILARITY_FLOOR;
use crate::phash::{PerceptualHash, PerceptualHasher};

/// Outcome of scoring one candidate against a baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimilarityScore {
    pub similarity: f64,
    pub distance: u32,
    pub tampered: bool,
}

impl SimilarityScore {
    /// Score for a known Hamming distance.
    pub fn from_distance(distance: u32, tamper_floor: f64) -> Self {
        let distance = distance.min(HASH_BITS);
        let similarity = similarity_from_distance(distance);
        Self {
            similarity,
            distance,
            tampered: similarity > tamper_floor && distance > 0,
        }
    }
}

/// Scores candidate images against a baseline fingerprint.
#[derive(Debug, Clone, Copy)]
pub struct SimilarityScorer {
    hasher: PerceptualHasher,
    tamper_floor: f64,
}

impl Default for SimilarityScorer {
    fn default() -> Self {
        Self::new(DEFAULT_TAMPER_SIMILARITY_FLOOR)
    }
}

impl SimilarityScorer {
    pub fn new(tamper_floor: f64) -> Self {
        Self {
            hasher: PerceptualHasher::new(),
            tamper_floor,
        }
    }

    pub fn hasher(&self) -> &PerceptualHasher {
        &self.hasher
    }

    /// Score two fingerprints.
    pub fn score_hashes(&self, baseline: &PerceptualHash, candidate: &PerceptualHash) -> SimilarityScore {
        SimilarityScore::from_distance(baseline.distance(candidate), self.tamper_floor)
    }

    /// Hash `candidate_image` and score it against `baseline`.
    /// `None` when the candidate cannot be decoded or hashed.
    pub fn score(&self, baseline: &PerceptualHash, candidate_image: &[u8]) -> Option<SimilarityScore> {
        match self.hasher.hash_bytes(candidate_image) {
            Ok(candidate) => Some(self.score_hashes(baseline, &candidate)),
            Err(e) => {
                tracing::debug!("Candidate not scored: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash_with_distance(base: u64, d: u32) -> PerceptualHash {
        // Flip the lowest `d` bits.
        let mask = if d >= 64 { u64::MAX } else { (1u64 << d) - 1 };
        PerceptualHash(base ^ mask)
    }

    #[test]
    fn identical_fingerprints_are_not_tampered() {
        let scorer = SimilarityScorer::default();
        let base = PerceptualHash(0xdead_beef_cafe_f00d);
        let s = scorer.score_hashes(&base, &base);
        assert_eq!(s.distance, 0);
        assert_eq!(s.similarity, 1.0);
        assert!(!s.tampered);
    }

    #[test]
    fn light_recompression_is_tampered() {
        let scorer = SimilarityScorer::default();
        let base = PerceptualHash(0x0123_4567_89ab_cdef);
        let s = scorer.score_hashes(&base, &hash_with_distance(base.0, 3));
        assert_eq!(s.distance, 3);
        assert!((s.similarity - 0.953125).abs() < 1e-12);
        assert!(s.tampered);
    }

    #[test]
    fn unrelated_image_scores_low() {
        let scorer = SimilarityScorer::default();
        let base = PerceptualHash(0);
        let s = scorer.score_hashes(&base, &hash_with_distance(0, 40));
        assert!((s.similarity - 0.375).abs() < 1e-12);
        assert!(!s.tampered);
    }

    #[test]
    fn tamper_iff_above_floor_and_nonzero_distance() {
        let scorer = SimilarityScorer::default();
        for d in 0..=64u32 {
            let s = scorer.score_hashes(&PerceptualHash(0), &hash_with_distance(0, d));
            let expected = s.similarity > 0.85 && d > 0;
            assert_eq!(s.tampered, expected, "d={}", d);
            assert!((s.similarity - (1.0 - d as f64 / 64.0)).abs() < 1e-12);
        }
        // The tamper band is d in 1..=9 at the default floor.
        assert!(SimilarityScore::from_distance(9, 0.85).tampered);
        assert!(!SimilarityScore::from_distance(10, 0.85).tampered);
    }

    #[test]
    fn undecodable_candidate_has_no_score() {
        let scorer = SimilarityScorer::default();
        assert_eq!(scorer.score(&PerceptualHash(0), b"garbage"), None);
        assert_eq!(scorer.score(&PerceptualHash(0), &[]), None);
    }

    #[test]
    fn decodable_candidate_is_scored() {
        let mut png = Vec::new();
        let img = image::RgbImage::from_fn(32, 32, |x, y| image::Rgb([(x * 8) as u8, (y * 8) as u8, 0]));
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let scorer = SimilarityScorer::default();
        let baseline = scorer.hasher().hash_bytes(&png).unwrap();
        let s = scorer.score(&baseline, &png).unwrap();
        assert_eq!(s.distance, 0);
        assert_eq!(s.similarity, 1.0);
    }
}
