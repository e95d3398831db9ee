//! Convenient re-exports for downstream crates.

pub use crate::conf::{keys as conf_keys, JobConf};
pub use crate::config::HistoryConfig;
pub use crate::counters::Counters;
pub use crate::error::{Error, ParseErrorKind, Result, SpecParseError};
pub use crate::id::JobId;
pub use crate::input_spec::{InputFormat, InputSpec};
pub use crate::output_spec::{OutputFormat, OutputSpec};
pub use crate::record::{JobEndStatus, JobRecord};
