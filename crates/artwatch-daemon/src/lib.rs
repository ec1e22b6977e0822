// crates/artwatch-daemon/src/lib.rs
//
// artwatch-daemon: configuration loading, component wiring and the control
// endpoint. The operator CLI reuses the configuration and the control
// envelope types.

pub mod config;
pub mod control;
pub mod wiring;

pub use config::{expand_tilde, parse_duration, DaemonConfig};
pub use control::{ArtworkRegistry, ControlRequest, ControlResponse, ControlState};
pub use wiring::{build_crawler, open_store};
