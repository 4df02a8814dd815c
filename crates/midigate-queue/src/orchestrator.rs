//! Job orchestration: submit, poll until terminal, fetch the result.
//!
//! Polling is an explicit loop with an attempt counter. Each attempt waits
//! the policy interval and then queries status once:
//!
//! - `COMPLETED` returns the output immediately
//! - `FAILED` stops immediately with the remote details
//! - anything else (queued, in progress, unrecognized) keeps polling
//!
//! Exhausting the attempt budget yields [`JobOutcome::TimedOut`]. The wait is
//! a `tokio::time::sleep`, so a polling request only parks its own task.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use tracing::Instrument;

use midigate_models::{JobId, JobOutcome, JobStatus, ResultReference, StagedUrl};

use crate::client::QueueClient;
use crate::config::PollPolicy;
use crate::error::{QueueError, QueueResult};
use crate::fetch::{extract_result_reference, ResultFetcher};
use crate::logging::JobLogger;
use crate::metrics;
use crate::types::StatusResponse;

/// Anything that can report a job's current status.
#[async_trait]
pub trait JobStatusSource: Send + Sync {
    async fn job_status(&self, job_id: &JobId) -> QueueResult<StatusResponse>;
}

/// Poll `job_id` until it reaches a terminal status or the budget runs out.
///
/// A failed status query aborts polling with that error. Progress lines go
/// through the caller's `logger`.
pub async fn poll_job<S>(
    source: &S,
    job_id: &JobId,
    policy: PollPolicy,
    logger: &JobLogger,
) -> QueueResult<JobOutcome>
where
    S: JobStatusSource + ?Sized,
{
    for attempt in 1..=policy.max_attempts {
        tokio::time::sleep(policy.interval).await;

        let response = source.job_status(job_id).await?;
        metrics::record_poll_attempt();

        match response.status {
            JobStatus::Completed => {
                return Ok(JobOutcome::Completed {
                    output: response.output.unwrap_or(Value::Null),
                    attempts: attempt,
                });
            }
            JobStatus::Failed => {
                return Ok(JobOutcome::Failed {
                    details: response.failure_details(),
                    attempts: attempt,
                });
            }
            ref other => logger.log_progress(attempt, other.as_str()),
        }
    }

    Ok(JobOutcome::TimedOut {
        attempts: policy.max_attempts,
    })
}

/// Drives one job per inbound request from submission to artifact bytes.
#[derive(Clone)]
pub struct JobOrchestrator {
    client: QueueClient,
    fetcher: ResultFetcher,
    policy: PollPolicy,
}

impl JobOrchestrator {
    pub fn new(client: QueueClient) -> QueueResult<Self> {
        let fetcher = ResultFetcher::new(client.config().fetch_timeout)?;
        let policy = client.config().poll;
        Ok(Self {
            client,
            fetcher,
            policy,
        })
    }

    pub fn client(&self) -> &QueueClient {
        &self.client
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Submit a job referencing the staged input.
    pub async fn submit(&self, staged: &StagedUrl) -> QueueResult<JobId> {
        let result = self.client.submit(staged).await;
        metrics::record_submission(result.is_ok());
        result
    }

    /// Poll a submitted job and return its output payload on success.
    pub async fn poll(&self, job_id: &JobId) -> QueueResult<Value> {
        let logger = JobLogger::new(job_id, "poll");
        let outcome = poll_job(&self.client, job_id, self.policy, &logger)
            .instrument(logger.create_span())
            .await?;
        metrics::record_outcome(outcome.label(), outcome.attempts());

        match outcome {
            JobOutcome::Completed { output, attempts } => {
                logger.log_completion(&format!("after {} status checks", attempts));
                Ok(output)
            }
            JobOutcome::Failed { details, attempts } => {
                logger.log_error(&format!("remote failure after {} status checks: {}", attempts, details));
                Err(QueueError::JobFailed {
                    job_id: job_id.clone(),
                    details,
                })
            }
            JobOutcome::TimedOut { attempts } => {
                logger.log_warning(&format!("no terminal status after {} checks", attempts));
                if self.client.config().cancel_on_timeout {
                    if let Err(e) = self.client.cancel(job_id).await {
                        logger.log_warning(&format!("cancel failed: {}", e));
                    }
                }
                Err(QueueError::Timeout {
                    job_id: job_id.clone(),
                    attempts,
                    waited_secs: self.policy.ceiling().as_secs(),
                })
            }
        }
    }

    /// Extract the result reference from a completed job's output.
    pub fn result_reference(&self, output: &Value) -> QueueResult<ResultReference> {
        extract_result_reference(output, &self.client.config().output_key)
    }

    /// Download the artifact behind a result reference.
    pub async fn fetch(&self, reference: &ResultReference) -> QueueResult<Bytes> {
        self.fetcher.fetch(reference).await
    }

    /// Submit, poll and fetch in sequence.
    pub async fn run(&self, staged: &StagedUrl) -> QueueResult<Bytes> {
        let job_id = self.submit(staged).await?;
        JobLogger::new(&job_id, "transcribe").log_start(staged.as_str());

        let output = self.poll(&job_id).await?;
        let reference = self.result_reference(&output)?;
        self.fetch(&reference).await
    }
}
