use thiserror::Error;

/// Canonical result for core.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    SpecParse(#[from] SpecParseError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serde(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serde(e.to_string())
    }
}

/// The grammar rule an input/output spec string violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("unknown format '{0}'")]
    UnknownFormat(String),

    #[error("missing required location")]
    MissingLocation,

    #[error("empty location in location list")]
    EmptyLocation,

    #[error("format '{format}' accepts exactly one location, got {count}")]
    TooManyLocations { format: &'static str, count: usize },

    #[error("missing required splits (expected '@<n>' after the location)")]
    MissingSplits,

    #[error("invalid splits '{0}' (expected a positive integer)")]
    InvalidSplits(String),
}

/// A malformed spec string. Carries the violated rule and the original text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} in spec '{input}'")]
pub struct SpecParseError {
    pub kind: ParseErrorKind,
    pub input: String,
}

impl SpecParseError {
    pub fn new(kind: ParseErrorKind, input: impl Into<String>) -> Self {
        Self {
            kind,
            input: input.into(),
        }
    }

    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }

    pub fn input(&self) -> &str {
        &self.input
    }
}
