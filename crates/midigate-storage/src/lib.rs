//! Object storage staging client.
//!
//! This crate provides:
//! - Signed uploads of local files to the storage provider
//! - Automatic resource-type detection (`auto` upload endpoint)
//! - Public URLs for staged inputs

pub mod client;
pub mod error;
pub mod signature;

pub use client::{StagingClient, StorageConfig};
pub use error::{StorageError, StorageResult};
