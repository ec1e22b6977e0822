// crates/artwatch-cli/src/commands/mod.rs
//
// Command module declarations for the artwatch CLI, plus the error type the
// commands share.

pub mod findings;
pub mod import;
pub mod mark;
pub mod notifications;
pub mod report;
pub mod scan;
pub mod stats;
pub mod status;

use artwatch_core::ArtwatchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not reach artwatch-daemon at {endpoint}: {source}")]
    Unreachable {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The daemon rejected the call.
    #[error("{0}")]
    Daemon(String),

    #[error(transparent)]
    Artwatch(#[from] ArtwatchError),
}
