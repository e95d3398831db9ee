//! Job history records.
//!
//! A `JobRecord` is the read-side view of one row in the history table. Fields
//! that were never written are `None`: a record staged by a job that crashed
//! before finalization has its start fields but no end fields.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::counters::Counters;
use crate::error::Error;
use crate::id::JobId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobEndStatus {
    Running,
    Succeeded,
    Failed,
}

impl JobEndStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            JobEndStatus::Running => "RUNNING",
            JobEndStatus::Succeeded => "SUCCEEDED",
            JobEndStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for JobEndStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobEndStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RUNNING" => Ok(JobEndStatus::Running),
            "SUCCEEDED" => Ok(JobEndStatus::Succeeded),
            "FAILED" => Ok(JobEndStatus::Failed),
            other => Err(Error::Serde(format!("unknown job end status '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: JobId,
    pub job_name: Option<String>,

    /// Milliseconds since Unix epoch (UTC).
    pub start_time: Option<u64>,
    pub end_time: Option<u64>,

    pub end_status: Option<JobEndStatus>,
    pub counters: Option<Counters>,

    /// Serialized `JobConf` captured at submission.
    pub configuration: Option<String>,

    pub extensions: BTreeMap<String, String>,
}

impl JobRecord {
    /// An empty record for `job_id`; every other field absent.
    pub fn new(job_id: JobId) -> Self {
        Self {
            job_id,
            job_name: None,
            start_time: None,
            end_time: None,
            end_status: None,
            counters: None,
            configuration: None,
            extensions: BTreeMap::new(),
        }
    }

    /// Effective status: a record without a written end status is still running.
    pub fn status(&self) -> JobEndStatus {
        self.end_status.unwrap_or(JobEndStatus::Running)
    }

    pub fn duration_ms(&self) -> Option<u64> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(end.saturating_sub(start)),
            _ => None,
        }
    }
}
