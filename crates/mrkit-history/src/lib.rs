#![forbid(unsafe_code)]
//! mrkit-history: the job history table and its text reports.
//!
//! One row per job id in a table with two column families:
//! - `info`: jobName, jobId, startTime, endTime, jobEndStatus, counters,
//!   configuration;
//! - `extended`: free-form extension columns, one qualifier per key.
//!
//! Writes are never buffered. Callers on the job-submission path must treat
//! every error from this crate as non-fatal to the job itself.

pub mod error;
pub mod layout;
pub mod reporter;
pub mod store;

pub use error::{HistoryError, Result};
pub use reporter::{format_timestamp, JobHistoryReporter, ReportOptions};
pub use store::{JobHistoryStore, JobRecords};
