//! Background synchronization.
//!
//! [`SyncScheduler`] drives the engine on a fixed interval; [`SyncState`]
//! tells readers whether the clone is ready.

mod scheduler;
mod state;

pub use scheduler::{SyncHandle, SyncScheduler};
pub use state::SyncState;
