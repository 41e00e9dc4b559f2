//! Stripeio Common - Shared types and utilities
//!
//! This crate provides common types, error definitions, and per-shard
//! hashing used across all stripeio components.

pub mod checksum;
pub mod config;
pub mod error;
pub mod types;

pub use checksum::{ShardHasher, ShardHashes};
pub use config::WriteConfig;
pub use error::{Error, Result};
pub use types::*;
