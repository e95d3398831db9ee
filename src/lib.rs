#![forbid(unsafe_code)]
//! mrkit: output specs and job execution history for batch producer jobs.
//!
//! Facade over the workspace crates:
//! - `mrkit_core`: spec grammars, job records, counters, configuration;
//! - `mrkit_store`: the structured-storage table abstraction and its backends;
//! - `mrkit_history`: the job history table and its reports;
//! - `mrkit_exec`: producers, the local engine, and the history-recording runner.

pub use mrkit_core;
pub use mrkit_exec;
pub use mrkit_history;
pub use mrkit_store;

pub use mrkit_core::{JobRecord, OutputSpec};
pub use mrkit_exec::{JobRunner, RunContext};
pub use mrkit_history::{JobHistoryReporter, JobHistoryStore};
