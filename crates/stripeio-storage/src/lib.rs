//! Stripeio Storage - Endpoints and the erasure-coded write path
//!
//! This crate provides the storage-endpoint capability trait, a local
//! filesystem endpoint, and `create_part`, which streams one object part
//! across a set of endpoints with Reed-Solomon parity, per-shard SHA-512
//! digests, and a per-stripe write quorum.

pub mod endpoint;
pub mod local;
pub mod write;

pub use endpoint::{EndpointSlot, StorageEndpoint};
pub use local::LocalEndpoint;
pub use write::create_part;
