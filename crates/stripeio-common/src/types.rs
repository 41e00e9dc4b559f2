//! Core metadata types for the erasure write path
//!
//! This module defines the persistent erasure descriptor carried per
//! endpoint, its checksum entries, and the validated name types used by
//! storage endpoints.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Algorithm tag recorded in every erasure descriptor.
pub const ERASURE_ALGORITHM: &str = "reed-solomon";

/// Algorithm tag recorded in every checksum entry.
pub const HASH_ALGORITHM: &str = "sha512";

/// Maximum part path length in bytes (4k limit on all unixes).
pub const PART_PATH_MAX: usize = 4096;

/// Per-part integrity record carried by an erasure descriptor.
///
/// One entry is appended per written part; the digest covers the shard
/// bytes the owning endpoint received, in stripe order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumEntry {
    /// Name of the part this digest covers
    pub part_name: String,
    /// Digest algorithm tag
    pub algorithm: String,
    /// Hex-encoded digest
    pub hash: String,
}

impl ChecksumEntry {
    /// Create a SHA-512 checksum entry
    #[must_use]
    pub fn sha512(part_name: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            part_name: part_name.into(),
            algorithm: HASH_ALGORITHM.to_string(),
            hash: hash.into(),
        }
    }
}

/// Persistent erasure metadata for one endpoint's copy of an object part
///
/// The descriptor fixes the write geometry (block size, shard counts) and
/// the distribution vector mapping endpoint index to logical shard index.
/// All valid descriptors participating in a write agree on geometry; the
/// distribution is persisted so reads can unshuffle shards back into
/// logical order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErasureDescriptor {
    /// Erasure algorithm tag
    pub algorithm: String,
    /// Number of data shards (D)
    pub data_shards: usize,
    /// Number of parity shards (P)
    pub parity_shards: usize,
    /// Block size in bytes (B); one stripe is produced per block read
    pub block_size: usize,
    /// Permutation of `1..=N` (N = D + P); endpoint `i` stores shard
    /// `distribution[i] - 1`
    pub distribution: Vec<usize>,
    /// Append-only per-part checksum entries
    #[serde(default)]
    pub checksums: Vec<ChecksumEntry>,
}

impl ErasureDescriptor {
    /// Create a descriptor with the identity distribution
    #[must_use]
    pub fn new(data_shards: usize, parity_shards: usize, block_size: usize) -> Self {
        let total = data_shards + parity_shards;
        Self::with_distribution(
            data_shards,
            parity_shards,
            block_size,
            (1..=total).collect(),
        )
    }

    /// Create a descriptor with an explicit distribution vector
    #[must_use]
    pub fn with_distribution(
        data_shards: usize,
        parity_shards: usize,
        block_size: usize,
        distribution: Vec<usize>,
    ) -> Self {
        Self {
            algorithm: ERASURE_ALGORITHM.to_string(),
            data_shards,
            parity_shards,
            block_size,
            distribution,
            checksums: Vec::new(),
        }
    }

    /// Total number of shards (N = D + P)
    #[must_use]
    pub fn total_shards(&self) -> usize {
        self.data_shards + self.parity_shards
    }

    /// Whether this descriptor can seed a write
    ///
    /// A descriptor is valid when all fields are populated and the
    /// distribution is a permutation of `1..=N`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.algorithm.is_empty()
            && self.data_shards > 0
            && self.block_size > 0
            && is_permutation(&self.distribution, self.total_shards())
    }
}

/// Check that `distribution` is a permutation of `1..=n`.
fn is_permutation(distribution: &[usize], n: usize) -> bool {
    if distribution.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &index in distribution {
        if index == 0 || index > n || seen[index - 1] {
            return false;
        }
        seen[index - 1] = true;
    }
    true
}

/// Volume name validated against object-layer requirements
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VolumeName(String);

impl VolumeName {
    /// Create a new volume name (3-63 bytes, no `/`)
    pub fn new(name: impl Into<String>) -> Result<Self, VolumeNameError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Get the volume name as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(name: &str) -> Result<(), VolumeNameError> {
        if name.len() < 3 {
            return Err(VolumeNameError::TooShort);
        }
        if name.len() > 63 {
            return Err(VolumeNameError::TooLong);
        }
        if name.contains('/') {
            return Err(VolumeNameError::ContainsSlash);
        }
        Ok(())
    }
}

impl fmt::Debug for VolumeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VolumeName({:?})", self.0)
    }
}

impl fmt::Display for VolumeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors that can occur when creating a volume name
#[derive(Debug, Clone, Error)]
pub enum VolumeNameError {
    #[error("volume name must be at least 3 bytes")]
    TooShort,
    #[error("volume name must be at most 63 bytes")]
    TooLong,
    #[error("volume name cannot contain '/'")]
    ContainsSlash,
}

/// Part path validated against filesystem limitations
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartPath(String);

impl PartPath {
    /// Create a new part path (non-empty, at most 4096 bytes)
    pub fn new(path: impl Into<String>) -> Result<Self, PartPathError> {
        let path = path.into();
        Self::validate(&path)?;
        Ok(Self(path))
    }

    /// Get the part path as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(path: &str) -> Result<(), PartPathError> {
        if path.is_empty() {
            return Err(PartPathError::Empty);
        }
        if path.len() > PART_PATH_MAX {
            return Err(PartPathError::TooLong);
        }
        Ok(())
    }
}

impl fmt::Debug for PartPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PartPath({:?})", self.0)
    }
}

impl fmt::Display for PartPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors that can occur when creating a part path
#[derive(Debug, Clone, Error)]
pub enum PartPathError {
    #[error("part path cannot be empty")]
    Empty,
    #[error("part path cannot exceed {PART_PATH_MAX} bytes")]
    TooLong,
}
