// crates/artwatch-core/src/lib.rs
//
// artwatch-core: Core types, traits, and error taxonomy for artwatch.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines the artwork and finding records, the error enum shared by every
// layer, and the trait seams (store, search backend, image fetcher, alerter)
// the crawler is wired through.

pub mod artwork;
pub mod error;
pub mod finding;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use artwatch_core::Finding;`

pub use artwork::Artwork;
pub use error::{ArtwatchError, BatchFailure};
pub use finding::{similarity_from_distance, Candidate, Finding, FindingStatus, HASH_BITS};
pub use traits::{Alerter, ArtworkStore, ImageFetcher, SearchBackend};
