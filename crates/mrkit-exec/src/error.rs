use std::time::Duration;

use mrkit_core::SpecParseError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExecError>;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error(transparent)]
    Spec(#[from] SpecParseError),

    #[error("unknown producer '{0}'")]
    UnknownProducer(String),

    #[error("invalid job: {0}")]
    InvalidJob(String),

    #[error("engine error: {0}")]
    Engine(String),

    #[error("job {job_id} did not complete within {waited:?}")]
    Timeout { job_id: String, waited: Duration },

    #[error("output error: {0}")]
    Output(String),
}

impl From<std::io::Error> for ExecError {
    fn from(e: std::io::Error) -> Self {
        ExecError::Output(e.to_string())
    }
}
