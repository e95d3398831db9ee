//! Task handle for a submitted job.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use mrkit_core::{Counters, JobEndStatus, JobId};

use crate::error::{ExecError, Result};

/// One emitted value, tagged with the input row it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord {
    pub key: String,
    pub column: String,
    pub value: String,
}

/// Terminal state of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub status: JobEndStatus,
    pub counters: Counters,
    pub outputs: Vec<OutputRecord>,
    /// First error, for failed jobs.
    pub error: Option<String>,
}

impl JobOutcome {
    pub fn failed(error: impl Into<String>, counters: Counters) -> Self {
        Self {
            status: JobEndStatus::Failed,
            counters,
            outputs: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_successful(&self) -> bool {
        self.status == JobEndStatus::Succeeded
    }
}

#[derive(Default)]
struct Slot {
    outcome: Mutex<Option<JobOutcome>>,
    done: Condvar,
}

impl Slot {
    fn lock(&self) -> MutexGuard<'_, Option<JobOutcome>> {
        // The slot only ever holds a finished value, so a poisoned lock is still usable.
        self.outcome.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Handle on a running job. Cheap to clone; clones observe the same job.
#[derive(Clone)]
pub struct JobHandle {
    job_id: JobId,
    slot: Arc<Slot>,
}

/// Engine side of a `JobHandle`. Completes the job exactly once.
///
/// Dropping a completer without calling `complete` (e.g. the worker thread
/// panicked) fails the job.
pub struct JobCompleter {
    slot: Option<Arc<Slot>>,
}

impl JobHandle {
    /// A pending handle and the completer that will resolve it.
    pub fn new(job_id: JobId) -> (JobHandle, JobCompleter) {
        let slot = Arc::new(Slot::default());
        (
            JobHandle {
                job_id,
                slot: Arc::clone(&slot),
            },
            JobCompleter { slot: Some(slot) },
        )
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Non-blocking completion check.
    pub fn is_complete(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// The outcome, if the job has completed.
    pub fn try_outcome(&self) -> Option<JobOutcome> {
        self.slot.lock().clone()
    }

    /// Block until the job completes or `timeout` elapses.
    pub fn wait(&self, timeout: Duration) -> Result<JobOutcome> {
        let deadline = Instant::now() + timeout;
        let mut guard = self.slot.lock();
        loop {
            if let Some(outcome) = guard.as_ref() {
                return Ok(outcome.clone());
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(ExecError::Timeout {
                    job_id: self.job_id.to_string(),
                    waited: timeout,
                });
            }
            guard = match self.slot.done.wait_timeout(guard, deadline - now) {
                Ok((g, _)) => g,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
    }
}

impl std::fmt::Debug for JobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobHandle")
            .field("job_id", &self.job_id)
            .field("complete", &self.is_complete())
            .finish()
    }
}

impl JobCompleter {
    pub fn complete(mut self, outcome: JobOutcome) {
        self.resolve(outcome);
    }

    fn resolve(&mut self, outcome: JobOutcome) {
        if let Some(slot) = self.slot.take() {
            let mut guard = slot.lock();
            if guard.is_none() {
                *guard = Some(outcome);
            }
            drop(guard);
            slot.done.notify_all();
        }
    }
}

impl Drop for JobCompleter {
    fn drop(&mut self) {
        if self.slot.is_some() {
            self.resolve(JobOutcome::failed(
                "job worker exited without reporting an outcome",
                Counters::new(),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn ok() -> JobOutcome {
        JobOutcome {
            status: JobEndStatus::Succeeded,
            counters: Counters::new(),
            outputs: Vec::new(),
            error: None,
        }
    }

    #[test]
    fn wait_times_out_while_pending() {
        let (handle, _completer) = JobHandle::new(JobId::from("job_1"));
        assert!(!handle.is_complete());
        assert!(matches!(
            handle.wait(Duration::from_millis(20)),
            Err(ExecError::Timeout { .. })
        ));
    }

    #[test]
    fn completion_wakes_waiters() {
        let (handle, completer) = JobHandle::new(JobId::from("job_1"));
        let worker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            completer.complete(ok());
        });
        let outcome = handle.wait(Duration::from_secs(5)).unwrap();
        assert!(outcome.is_successful());
        assert!(handle.is_complete());
        worker.join().unwrap();
    }

    #[test]
    fn dropped_completer_fails_the_job() {
        let (handle, completer) = JobHandle::new(JobId::from("job_1"));
        drop(completer);
        let outcome = handle.try_outcome().unwrap();
        assert_eq!(outcome.status, JobEndStatus::Failed);
        assert!(outcome.error.is_some());
    }
}
