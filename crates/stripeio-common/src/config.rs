//! Configuration types for stripeio
//!
//! Defaults used when seeding fresh erasure descriptors for a write.

use crate::types::ErasureDescriptor;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const fn default_block_size() -> usize {
    1024 * 1024
}

const fn default_data_shards() -> usize {
    4
}

const fn default_parity_shards() -> usize {
    2
}

/// Write-path configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WriteConfig {
    /// Bytes read per stripe
    #[serde(default = "default_block_size")]
    pub block_size: usize,
    /// Number of data shards (D)
    #[serde(default = "default_data_shards")]
    pub data_shards: usize,
    /// Number of parity shards (P)
    #[serde(default = "default_parity_shards")]
    pub parity_shards: usize,
    /// Minimum successful appends per stripe; defaults to D + 1
    #[serde(default)]
    pub write_quorum: Option<usize>,
}

impl WriteConfig {
    /// Total number of shards (N = D + P)
    #[must_use]
    pub fn total_shards(&self) -> usize {
        self.data_shards + self.parity_shards
    }

    /// Effective write quorum
    #[must_use]
    pub fn quorum(&self) -> usize {
        self.write_quorum.unwrap_or(self.data_shards + 1)
    }

    /// Check the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_shards == 0 {
            return Err(ConfigError::ZeroDataShards);
        }
        if self.block_size == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }
        let quorum = self.quorum();
        if quorum == 0 || quorum > self.total_shards() {
            return Err(ConfigError::QuorumOutOfRange {
                quorum,
                total: self.total_shards(),
            });
        }
        Ok(())
    }

    /// Build a fresh descriptor with the identity distribution
    #[must_use]
    pub fn descriptor(&self) -> ErasureDescriptor {
        ErasureDescriptor::new(self.data_shards, self.parity_shards, self.block_size)
    }
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self {
            block_size: default_block_size(),
            data_shards: default_data_shards(),
            parity_shards: default_parity_shards(),
            write_quorum: None,
        }
    }
}

/// Errors that can occur when validating a write configuration
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("data_shards must be > 0")]
    ZeroDataShards,
    #[error("block_size must be > 0")]
    ZeroBlockSize,
    #[error("write quorum {quorum} out of range for {total} shards")]
    QuorumOutOfRange { quorum: usize, total: usize },
}
