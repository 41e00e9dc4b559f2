//! Stripeio Erasure Coding - Block-oriented Reed-Solomon codec
//!
//! This crate turns one block of part data into `D + P` equal-length
//! shards (data in input order, then parity) and reconstructs blocks from
//! any `D` surviving shards.

pub mod codec;

pub use codec::{BlockCodec, CodecError};
