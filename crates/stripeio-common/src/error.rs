//! Error types for stripeio
//!
//! This module defines the common error type used throughout the system.

use crate::types::{PartPathError, VolumeNameError};
use thiserror::Error;

/// Common result type for stripeio operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for stripeio
#[derive(Debug, Error)]
pub enum Error {
    // Geometry selection
    #[error("no valid erasure descriptor available")]
    GeometryUnavailable,

    // Codec faults
    #[error("erasure codec init failed: {0}")]
    CodecInit(String),

    #[error("block split failed: {0}")]
    BlockSplit(String),

    #[error("parity encode failed: {0}")]
    ParityEncode(String),

    #[error("shard reconstruction failed: {0}")]
    Reconstruct(String),

    #[error("insufficient shards for reconstruction: have {available}, need {required}")]
    InsufficientShards { available: usize, required: usize },

    // Stream faults
    #[error("stream read failed: {0}")]
    StreamRead(#[source] std::io::Error),

    // Quorum verdict
    #[error("write quorum lost for {volume}/{path}")]
    WriteQuorumLost { volume: String, path: String },

    // Endpoint housekeeping
    #[error("invalid volume name: {0}")]
    InvalidVolumeName(#[from] VolumeNameError),

    #[error("invalid part path: {0}")]
    InvalidPartPath(#[from] PartPathError),

    #[error("endpoint I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error is the per-stripe quorum verdict
    #[must_use]
    pub fn is_quorum_loss(&self) -> bool {
        matches!(self, Self::WriteQuorumLost { .. })
    }

    /// Whether this error originated in the block codec
    #[must_use]
    pub fn is_codec_fault(&self) -> bool {
        matches!(
            self,
            Self::CodecInit(_) | Self::BlockSplit(_) | Self::ParityEncode(_)
        )
    }
}
