//! Storage endpoint capability

use async_trait::async_trait;
use std::sync::Arc;
use stripeio_common::Result;

/// One backend store for shard appends
///
/// Implementations must create the target resource (and any parent
/// directories) on first append; appending an empty payload is legal and
/// materializes the resource, which is how readers distinguish an empty
/// part from a missing one.
#[async_trait]
pub trait StorageEndpoint: Send + Sync {
    /// Append `data` to `path` inside `volume`, creating it if absent
    async fn append(&self, volume: &str, path: &str, data: &[u8]) -> Result<()>;

    /// Create `volume`, along with any necessary parents
    async fn make_volume(&self, volume: &str) -> Result<()>;

    /// Remove `volume` and everything it contains
    ///
    /// Removing a volume that does not exist is not an error.
    async fn delete_volume(&self, volume: &str) -> Result<()>;

    /// Read the full contents of `path` inside `volume`
    async fn read_file(&self, volume: &str, path: &str) -> Result<Vec<u8>>;
}

/// Endpoint slot in a write call
///
/// `None` marks an endpoint that is offline; its appends count as failed
/// for quorum purposes.
pub type EndpointSlot = Option<Arc<dyn StorageEndpoint>>;
