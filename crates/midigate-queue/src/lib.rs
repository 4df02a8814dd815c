//! Asynchronous job-queue integration.
//!
//! This crate provides:
//! - A bearer-authenticated client for the queue's run/status/cancel API
//! - A fixed-interval, bounded-attempt polling orchestrator
//! - A fetcher for the artifact referenced by a completed job

pub mod client;
pub mod config;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod metrics;
pub mod orchestrator;
pub mod types;

pub use client::QueueClient;
pub use config::{PollPolicy, QueueConfig};
pub use error::{QueueError, QueueResult};
pub use fetch::{extract_result_reference, ResultFetcher};
pub use logging::JobLogger;
pub use orchestrator::{poll_job, JobOrchestrator, JobStatusSource};
pub use types::{RunRequest, RunResponse, StatusResponse};
