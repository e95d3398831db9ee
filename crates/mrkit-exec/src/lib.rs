#![forbid(unsafe_code)]
//! mrkit-exec: producer jobs and the job-submission layer.
//!
//! - `producer` / `registry`: the processing-unit capability and the table of
//!   named producers a job can ask for.
//! - `job`: `JobDefinition` (what the user asked for) and `PreparedJob` (the
//!   validated, ready-to-submit form).
//! - `engine` / `handle`: the execution engine seam and the task handle it
//!   returns. `LocalEngine` runs jobs on a worker thread.
//! - `dsl`: YAML job files.
//! - `runner`: submits jobs and records them in the history table. History
//!   failures are logged, never returned.

pub mod context;
pub mod dsl;
pub mod engine;
pub mod error;
pub mod handle;
pub mod job;
pub mod producer;
pub mod producers;
pub mod registry;
pub mod runner;

pub use context::RunContext;
pub use dsl::{apply_job_config, parse_yaml_job, JobFileConfig, ParsedJob};
pub use engine::{ExecutionEngine, LocalEngine};
pub use error::{ExecError, Result};
pub use handle::{JobCompleter, JobHandle, JobOutcome, OutputRecord};
pub use job::{JobDefinition, JobDefinitionBuilder, PreparedJob};
pub use producer::{counters, DataRequest, InputRow, ProduceError, Producer, ProducerContext};
pub use registry::Registry;
pub use runner::{JobRunner, SubmittedJob};
