//! Per-shard streaming hash state for the write path
//!
//! One SHA-512 state is kept per logical shard index. During a stripe's
//! fan-out the state for a shard is detached into the future performing
//! that endpoint's append and re-attached after the join, so no two tasks
//! ever share a hasher.

use sha2::{Digest, Sha512};

/// Owning handle over one shard's hash state
///
/// Detached from [`ShardHashes`] for the duration of a stripe's fan-out;
/// the owning task advances it only after its append succeeds.
pub struct ShardHasher {
    inner: Sha512,
}

impl ShardHasher {
    /// Feed shard bytes into the hash state
    pub fn update(&mut self, bytes: &[u8]) {
        self.inner.update(bytes);
    }
}

/// Independent streaming SHA-512 states, one per logical shard
pub struct ShardHashes {
    hashers: Vec<Sha512>,
}

impl ShardHashes {
    /// Create `count` fresh hash states
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            hashers: (0..count).map(|_| Sha512::new()).collect(),
        }
    }

    /// Number of shard states
    #[must_use]
    pub fn len(&self) -> usize {
        self.hashers.len()
    }

    /// Whether there are no shard states
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hashers.is_empty()
    }

    /// Feed bytes into the state at `index`
    pub fn update(&mut self, index: usize, bytes: &[u8]) {
        self.hashers[index].update(bytes);
    }

    /// Move the state at `index` out, leaving a fresh one behind
    ///
    /// The caller must re-attach via [`Self::attach`] before the next
    /// stripe touches this index.
    #[must_use]
    pub fn detach(&mut self, index: usize) -> ShardHasher {
        ShardHasher {
            inner: std::mem::replace(&mut self.hashers[index], Sha512::new()),
        }
    }

    /// Restore a detached state to `index`
    pub fn attach(&mut self, index: usize, hasher: ShardHasher) {
        self.hashers[index] = hasher.inner;
    }

    /// Hex-encoded digest of the state at `index`
    ///
    /// Snapshots the state, so calling this repeatedly (or continuing to
    /// update afterwards) is well-defined.
    #[must_use]
    pub fn digest_hex(&self, index: usize) -> String {
        hex::encode(self.hashers[index].clone().finalize())
    }
}
