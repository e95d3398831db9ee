#![forbid(unsafe_code)]
//! mrkit-core: pure value types shared by every other mrkit crate.
//!
//! - `output_spec`: the `format:location@splits` grammar and `OutputSpec`.
//! - `input_spec`: the `format:location[,location...]` grammar and `InputSpec`.
//! - `record`: `JobRecord` and `JobEndStatus`, the job history snapshot.
//! - `counters` / `conf`: the two text blobs a job record carries.
//! - `config`: `HistoryConfig`, read from the environment.
//!
//! Nothing here performs I/O; storage and execution live in the crates above.

pub mod conf;
pub mod config;
pub mod counters;
pub mod error;
pub mod id;
pub mod input_spec;
pub mod output_spec;
pub mod prelude;
pub mod record;

pub use conf::JobConf;
pub use config::HistoryConfig;
pub use counters::Counters;
pub use error::{Error, ParseErrorKind, Result, SpecParseError};
pub use id::JobId;
pub use input_spec::{InputFormat, InputSpec};
pub use output_spec::{OutputFormat, OutputSpec};
pub use record::{JobEndStatus, JobRecord};

/// Version string recorded in job configurations for provenance.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
