//! Job-submission layer: runs jobs and records them in the history table.
//!
//! Recording is best-effort. A history write that fails is logged with
//! `warn!` and otherwise ignored; it never changes a job's outcome.

use std::sync::{Arc, Once};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use mrkit_core::JobId;
use mrkit_history::JobHistoryStore;
use tracing::{info, warn};

use crate::context::RunContext;
use crate::engine::ExecutionEngine;
use crate::error::Result;
use crate::handle::{JobHandle, JobOutcome};
use crate::job::PreparedJob;

pub struct JobRunner {
    engine: Arc<dyn ExecutionEngine>,
    ctx: RunContext,
}

impl JobRunner {
    pub fn new(engine: Arc<dyn ExecutionEngine>, ctx: RunContext) -> Self {
        Self { engine, ctx }
    }

    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    /// Submit `job`, wait for it, and return its outcome. A failed job is an
    /// `Ok` outcome with `status == Failed`.
    pub fn run(&self, job: PreparedJob) -> Result<JobOutcome> {
        let submitted = self.submit(job)?;
        submitted.wait(self.ctx.wait_timeout())
    }

    /// Start `job` and stage its history record. Returns without waiting.
    pub fn submit(&self, job: PreparedJob) -> Result<SubmittedJob> {
        let job_name = job.name.clone();
        let configuration = match job.conf.to_text() {
            Ok(text) => text,
            Err(e) => {
                warn!(job_name = %job_name, error = %e, "cannot serialize job configuration");
                String::new()
            }
        };

        let start_time = now_ms();
        let handle = self.engine.submit(job)?;
        let history = self.ctx.history().cloned();

        if let Some(store) = &history {
            if let Err(e) = store.stage(handle.job_id(), &job_name, start_time, &configuration) {
                warn!(job_id = %handle.job_id(), error = %e, "failed to stage job history record");
            }
        }
        info!(job_id = %handle.job_id(), job_name = %job_name, "job submitted");

        Ok(SubmittedJob {
            handle,
            history,
            start_time,
            finalized: Once::new(),
        })
    }
}

/// A job started through `JobRunner::submit`.
///
/// The first observation of completion, through `is_complete` or `wait`,
/// finalizes the job's history record; later observations do not write again.
pub struct SubmittedJob {
    handle: JobHandle,
    history: Option<JobHistoryStore>,
    start_time: u64,
    finalized: Once,
}

impl SubmittedJob {
    pub fn job_id(&self) -> &JobId {
        self.handle.job_id()
    }

    pub fn handle(&self) -> &JobHandle {
        &self.handle
    }

    /// Non-blocking completion check.
    pub fn is_complete(&self) -> bool {
        match self.handle.try_outcome() {
            Some(outcome) => {
                self.record_completion(&outcome);
                true
            }
            None => false,
        }
    }

    pub fn wait(&self, timeout: Duration) -> Result<JobOutcome> {
        let outcome = self.handle.wait(timeout)?;
        self.record_completion(&outcome);
        Ok(outcome)
    }

    fn record_completion(&self, outcome: &JobOutcome) {
        self.finalized.call_once(|| {
            let Some(store) = &self.history else {
                return;
            };
            let end_time = now_ms().max(self.start_time);
            if let Err(e) = store.finalize(self.job_id(), end_time, outcome.status, &outcome.counters) {
                warn!(job_id = %self.job_id(), error = %e, "failed to finalize job history record");
            }
        });
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
