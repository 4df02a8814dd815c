//! Job-queue metrics.

use metrics::{counter, histogram};

pub mod names {
    pub const JOBS_SUBMITTED_TOTAL: &str = "midigate_jobs_submitted_total";
    pub const JOBS_FINISHED_TOTAL: &str = "midigate_jobs_finished_total";
    pub const JOB_POLL_ATTEMPTS_TOTAL: &str = "midigate_job_poll_attempts_total";
    pub const JOB_ATTEMPTS_TO_TERMINAL: &str = "midigate_job_attempts_to_terminal";
    pub const RESULT_FETCH_BYTES: &str = "midigate_result_fetch_bytes";
}

pub fn record_submission(success: bool) {
    let labels = [("result", if success { "ok" } else { "error" }.to_string())];
    counter!(names::JOBS_SUBMITTED_TOTAL, &labels).increment(1);
}

pub fn record_poll_attempt() {
    counter!(names::JOB_POLL_ATTEMPTS_TOTAL).increment(1);
}

/// Record how a job's polling ended ("completed", "failed", "timed_out").
pub fn record_outcome(outcome: &str, attempts: u32) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::JOBS_FINISHED_TOTAL, &labels).increment(1);
    histogram!(names::JOB_ATTEMPTS_TO_TERMINAL, &labels).record(attempts as f64);
}

pub fn record_fetch_bytes(bytes: usize) {
    histogram!(names::RESULT_FETCH_BYTES).record(bytes as f64);
}
