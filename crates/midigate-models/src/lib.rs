//! Shared data models for the midigate gateway.
//!
//! This crate provides Serde-serializable types for:
//! - Remote job identifiers, statuses and terminal outcomes
//! - Staged input URLs and result references

pub mod asset;
pub mod job;
pub mod job_status;

// Re-export common types
pub use asset::{ResultReference, StagedUrl, UrlError};
pub use job::{JobId, JobOutcome};
pub use job_status::JobStatus;
