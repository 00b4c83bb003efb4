//! Stratus Agent - a small host that polls account sources.
//!
//! The binary loads [`stratus_sources::IngestionSettings`], starts git
//! synchronization when it is enabled and lists every provider on a fixed
//! interval, logging what each source currently defines.

pub mod options;
pub mod poller;
pub mod shutdown;

pub use options::AgentOptions;
pub use poller::{ProviderReport, SyncHealth, poll_once, run, sync_health};
pub use shutdown::shutdown_signal;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
