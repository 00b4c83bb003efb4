//! The account source abstraction.

use async_trait::async_trait;
use stratus_core::{AccountRecord, Result};

/// A place account definitions of one provider type are read from.
///
/// Every call re-reads the source; nothing is cached between calls.
#[async_trait]
pub trait AccountSource<T: AccountRecord>: Send + Sync {
    /// Returns the source name for logs.
    fn name(&self) -> &str;

    /// Lists every account the source currently defines.
    async fn list(&self) -> Result<Vec<T>>;
}
