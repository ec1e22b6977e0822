// crates/artwatch-store/src/lib.rs
//
// artwatch-store: Storage and retrieval layer for artwatch.
//
// Provides the RocksDB-backed artwork/finding store, an in-memory store for
// tests and dry runs, the multi-gateway IPFS fetcher used for registered
// originals, and the direct HTTP fetcher used for search candidates.

pub mod gateway;
pub mod http;
pub mod memory;
pub mod rocks;

// Re-export key types for ergonomic access from downstream crates.
pub use gateway::{GatewayFetcher, DEFAULT_GATEWAYS};
pub use http::{HttpFetcher, DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_IMAGE_BYTES};
pub use memory::MemoryStore;
pub use rocks::RocksStore;
