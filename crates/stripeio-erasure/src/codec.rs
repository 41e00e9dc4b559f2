//! Block-oriented Reed-Solomon codec
//!
//! Splits a buffer of at most one block into `data_shards` slices of
//! exactly `ceil(n / data_shards)` bytes (zero-padding the tail) and
//! computes `parity_shards` parity slices over GF(2^8). Any `data_shards`
//! of the resulting shards reconstruct the block.
//!
//! # Example
//!
//! ```
//! use stripeio_erasure::BlockCodec;
//!
//! let codec = BlockCodec::new(4, 2).unwrap();
//! let shards = codec.encode(b"one block of part data").unwrap();
//! assert_eq!(shards.len(), 6);
//! ```

use bytes::Bytes;
use reed_solomon_erasure::galois_8::ReedSolomon;
use stripeio_common::Error as CommonError;
use thiserror::Error;

/// Largest shard count addressable in the GF(2^8) field.
const MAX_TOTAL_SHARDS: usize = 256;

/// Errors specific to the block codec
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid geometry: {0}")]
    Init(String),

    #[error("cannot split buffer: {0}")]
    Split(String),

    #[error("parity encoding failed: {0}")]
    Encode(String),

    #[error("reconstruction failed: {0}")]
    Reconstruct(String),

    #[error("insufficient shards: have {available}, need {required}")]
    InsufficientShards { available: usize, required: usize },
}

impl From<CodecError> for CommonError {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::Init(msg) => CommonError::CodecInit(msg),
            CodecError::Split(msg) => CommonError::BlockSplit(msg),
            CodecError::Encode(msg) => CommonError::ParityEncode(msg),
            CodecError::Reconstruct(msg) => CommonError::Reconstruct(msg),
            CodecError::InsufficientShards {
                available,
                required,
            } => CommonError::InsufficientShards {
                available,
                required,
            },
        }
    }
}

/// Reed-Solomon codec over one block of part data
///
/// Constructed once per write; the encoding tables are reused for every
/// stripe. `parity_shards == 0` is legal and degrades to pure striping.
pub struct BlockCodec {
    data_shards: usize,
    parity_shards: usize,
    encoder: Option<ReedSolomon>,
}

impl BlockCodec {
    /// Create a codec for the given shard geometry
    pub fn new(data_shards: usize, parity_shards: usize) -> Result<Self, CodecError> {
        if data_shards == 0 {
            return Err(CodecError::Init("data_shards must be > 0".into()));
        }
        if data_shards + parity_shards > MAX_TOTAL_SHARDS {
            return Err(CodecError::Init(format!(
                "total shards must be <= {MAX_TOTAL_SHARDS}"
            )));
        }
        let encoder = if parity_shards > 0 {
            Some(
                ReedSolomon::new(data_shards, parity_shards)
                    .map_err(|e| CodecError::Init(e.to_string()))?,
            )
        } else {
            None
        };
        Ok(Self {
            data_shards,
            parity_shards,
            encoder,
        })
    }

    /// Number of data shards (D)
    #[must_use]
    pub const fn data_shards(&self) -> usize {
        self.data_shards
    }

    /// Number of parity shards (P)
    #[must_use]
    pub const fn parity_shards(&self) -> usize {
        self.parity_shards
    }

    /// Total number of shards (N = D + P)
    #[must_use]
    pub const fn total_shards(&self) -> usize {
        self.data_shards + self.parity_shards
    }

    /// Shard length produced for an `n`-byte block
    #[must_use]
    pub fn shard_len(&self, n: usize) -> usize {
        n.div_ceil(self.data_shards)
    }

    /// Encode one block into `N` equal-length shards
    ///
    /// Shard `k` in `0..D` carries the k-th slice of `data` (the last
    /// slice zero-padded); shards `D..N` carry parity.
    pub fn encode(&self, data: &[u8]) -> Result<Vec<Bytes>, CodecError> {
        if data.is_empty() {
            return Err(CodecError::Split("empty input buffer".into()));
        }

        let shard_len = self.shard_len(data.len());
        let mut shards: Vec<Vec<u8>> = Vec::with_capacity(self.total_shards());
        for i in 0..self.data_shards {
            let start = (i * shard_len).min(data.len());
            let end = ((i + 1) * shard_len).min(data.len());
            let mut shard = vec![0u8; shard_len];
            shard[..end - start].copy_from_slice(&data[start..end]);
            shards.push(shard);
        }
        for _ in 0..self.parity_shards {
            shards.push(vec![0u8; shard_len]);
        }

        if let Some(encoder) = &self.encoder {
            encoder
                .encode(&mut shards)
                .map_err(|e| CodecError::Encode(e.to_string()))?;
        }

        Ok(shards.into_iter().map(Bytes::from).collect())
    }

    /// Reconstruct one block from at least `D` of its shards
    ///
    /// `shards` holds one slot per shard index, `None` for missing shards;
    /// missing slots are filled in place. The returned buffer is the
    /// original block, truncated to `original_len`.
    pub fn reconstruct(
        &self,
        shards: &mut [Option<Vec<u8>>],
        original_len: usize,
    ) -> Result<Vec<u8>, CodecError> {
        if shards.len() != self.total_shards() {
            return Err(CodecError::Reconstruct(format!(
                "expected {} shard slots, got {}",
                self.total_shards(),
                shards.len()
            )));
        }

        let available = shards.iter().filter(|s| s.is_some()).count();
        if available < self.data_shards {
            return Err(CodecError::InsufficientShards {
                available,
                required: self.data_shards,
            });
        }

        let data_present = shards[..self.data_shards].iter().all(Option::is_some);
        if !data_present {
            match &self.encoder {
                Some(encoder) => encoder
                    .reconstruct(shards)
                    .map_err(|e| CodecError::Reconstruct(e.to_string()))?,
                None => {
                    return Err(CodecError::InsufficientShards {
                        available,
                        required: self.data_shards,
                    })
                }
            }
        }

        let mut block = Vec::with_capacity(original_len);
        for shard in shards.iter().take(self.data_shards) {
            match shard {
                Some(bytes) => block.extend_from_slice(bytes),
                None => {
                    return Err(CodecError::Reconstruct(
                        "data shard missing after reconstruction".into(),
                    ))
                }
            }
        }
        block.truncate(original_len);
        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_shard_geometry() {
        let codec = BlockCodec::new(4, 2).unwrap();

        let shards = codec.encode(&[7u8; 1024]).unwrap();
        assert_eq!(shards.len(), 6);
        assert!(shards.iter().all(|s| s.len() == 256));

        // Final partial block of scenario-sized input
        let shards = codec.encode(&[7u8; 512]).unwrap();
        assert!(shards.iter().all(|s| s.len() == 128));
    }

    #[test]
    fn test_encode_pads_the_tail() {
        let codec = BlockCodec::new(4, 2).unwrap();
        let shards = codec.encode(&[0xAB; 10]).unwrap();

        // ceil(10 / 4) = 3; the last data shard holds one byte + padding
        assert!(shards.iter().all(|s| s.len() == 3));
        assert_eq!(&shards[3][..], &[0xAB, 0, 0]);
    }

    #[test]
    fn test_invalid_geometry() {
        assert!(matches!(BlockCodec::new(0, 2), Err(CodecError::Init(_))));
        assert!(matches!(
            BlockCodec::new(200, 100),
            Err(CodecError::Init(_))
        ));
    }

    #[test]
    fn test_empty_buffer_is_a_split_error() {
        let codec = BlockCodec::new(4, 2).unwrap();
        assert!(matches!(codec.encode(&[]), Err(CodecError::Split(_))));
    }

    #[test]
    fn test_reconstruct_with_missing_shards() {
        let codec = BlockCodec::new(4, 2).unwrap();
        let data: Vec<u8> = (0..1024u32).map(|i| (i % 251) as u8).collect();

        let shards = codec.encode(&data).unwrap();
        let mut slots: Vec<Option<Vec<u8>>> =
            shards.iter().map(|s| Some(s.to_vec())).collect();
        slots[1] = None;
        slots[4] = None;

        let block = codec.reconstruct(&mut slots, data.len()).unwrap();
        assert_eq!(block, data);
    }

    #[test]
    fn test_reconstruct_needs_data_count_shards() {
        let codec = BlockCodec::new(4, 2).unwrap();
        let shards = codec.encode(&[1u8; 64]).unwrap();

        let mut slots: Vec<Option<Vec<u8>>> =
            shards.iter().map(|s| Some(s.to_vec())).collect();
        slots[0] = None;
        slots[1] = None;
        slots[2] = None;

        assert!(matches!(
            codec.reconstruct(&mut slots, 64),
            Err(CodecError::InsufficientShards {
                available: 3,
                required: 4
            })
        ));
    }

    #[test]
    fn test_parity_free_striping() {
        let codec = BlockCodec::new(4, 0).unwrap();
        let data = b"plain striping without parity".to_vec();

        let shards = codec.encode(&data).unwrap();
        assert_eq!(shards.len(), 4);

        let mut slots: Vec<Option<Vec<u8>>> =
            shards.iter().map(|s| Some(s.to_vec())).collect();
        let block = codec.reconstruct(&mut slots, data.len()).unwrap();
        assert_eq!(block, data);

        // Without parity, a lost shard is unrecoverable
        let mut slots: Vec<Option<Vec<u8>>> =
            shards.iter().map(|s| Some(s.to_vec())).collect();
        slots[2] = None;
        assert!(codec.reconstruct(&mut slots, data.len()).is_err());
    }

    proptest! {
        #[test]
        fn prop_roundtrip_any_geometry(
            data in proptest::collection::vec(any::<u8>(), 1..4096),
            data_shards in 1usize..10,
            parity_shards in 0usize..5,
            drop_offset in 0usize..16,
        ) {
            let codec = BlockCodec::new(data_shards, parity_shards).unwrap();
            let shards = codec.encode(&data).unwrap();

            prop_assert_eq!(shards.len(), data_shards + parity_shards);
            prop_assert!(shards
                .iter()
                .all(|s| s.len() == data.len().div_ceil(data_shards)));

            // Drop up to `parity_shards` shards starting at an arbitrary
            // offset, wrapping around the stripe.
            let total = codec.total_shards();
            let mut slots: Vec<Option<Vec<u8>>> =
                shards.iter().map(|s| Some(s.to_vec())).collect();
            for k in 0..parity_shards {
                slots[(drop_offset + k) % total] = None;
            }

            let block = codec.reconstruct(&mut slots, data.len()).unwrap();
            prop_assert_eq!(block, data);
        }
    }
}
