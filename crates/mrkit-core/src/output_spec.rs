//! Output descriptors and the `format:location@splits` grammar.
//!
//! ```text
//! kiji:kiji://hbase/instance/table@123
//! hfile:kiji://hbase/instance/table;hdfs://localhost:1234/tmp/foo@8
//! ```
//!
//! The format is everything before the first `:`; the splits are everything
//! after the *last* `@`. Locations may therefore contain `:` and `;` freely.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, ParseErrorKind, Result, SpecParseError};

/// Writer strategy downstream code must use for a job's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutputFormat {
    Kiji,
    Text,
    SequenceFile,
    MapFile,
    HFile,
    Avro,
    AvroKeyValue,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 7] = [
        OutputFormat::Kiji,
        OutputFormat::Text,
        OutputFormat::SequenceFile,
        OutputFormat::MapFile,
        OutputFormat::HFile,
        OutputFormat::Avro,
        OutputFormat::AvroKeyValue,
    ];

    /// The token used in spec strings.
    pub const fn token(self) -> &'static str {
        match self {
            OutputFormat::Kiji => "kiji",
            OutputFormat::Text => "text",
            OutputFormat::SequenceFile => "seq",
            OutputFormat::MapFile => "map",
            OutputFormat::HFile => "hfile",
            OutputFormat::Avro => "avro",
            OutputFormat::AvroKeyValue => "avrokv",
        }
    }

    /// Case-sensitive token lookup.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.token() == token)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Where and how a batch job writes its results.
///
/// Serialized as its spec string; deserializing goes through `parse`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OutputSpec {
    format: OutputFormat,
    location: String,
    splits: u32,
}

impl OutputSpec {
    /// Build a descriptor programmatically.
    ///
    /// Only the constructor invariants are checked: `splits >= 1` and a
    /// non-empty location.
    pub fn create(format: OutputFormat, location: impl Into<String>, splits: u32) -> Result<Self> {
        let location = location.into();
        if splits < 1 {
            return Err(Error::InvalidArgument(format!(
                "splits must be at least 1, got {splits}"
            )));
        }
        if location.is_empty() {
            return Err(Error::InvalidArgument(
                "output location must not be empty".into(),
            ));
        }
        Ok(Self {
            format,
            location,
            splits,
        })
    }

    /// Parse `format:location@splits`.
    pub fn parse(text: &str) -> std::result::Result<Self, SpecParseError> {
        let fail = |kind| SpecParseError::new(kind, text);

        let Some((format_token, rest)) = text.split_once(':') else {
            return Err(fail(ParseErrorKind::MissingLocation));
        };
        let format = OutputFormat::from_token(format_token)
            .ok_or_else(|| fail(ParseErrorKind::UnknownFormat(format_token.to_string())))?;
        if rest.is_empty() {
            return Err(fail(ParseErrorKind::MissingLocation));
        }

        let Some((location, splits_text)) = rest.rsplit_once('@') else {
            return Err(fail(ParseErrorKind::MissingSplits));
        };
        if location.is_empty() {
            return Err(fail(ParseErrorKind::MissingLocation));
        }
        let splits = parse_splits(splits_text)
            .ok_or_else(|| fail(ParseErrorKind::InvalidSplits(splits_text.to_string())))?;

        Ok(Self {
            format,
            location: location.to_string(),
            splits,
        })
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn splits(&self) -> u32 {
        self.splits
    }

    /// Split a composite HFile location `table-uri;path` into its parts.
    ///
    /// Returns `None` for non-HFile outputs. A location without `;` is a bare
    /// path with no target table.
    pub fn hfile_locations(&self) -> Option<(Option<&str>, &str)> {
        if self.format != OutputFormat::HFile {
            return None;
        }
        Some(match self.location.split_once(';') {
            Some((table, path)) => (Some(table), path),
            None => (None, self.location.as_str()),
        })
    }
}

// Digits only: `str::parse` would also accept a leading '+'.
fn parse_splits(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse::<u32>().ok().filter(|n| *n >= 1)
}

impl fmt::Display for OutputSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}@{}", self.format, self.location, self.splits)
    }
}

impl FromStr for OutputSpec {
    type Err = SpecParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for OutputSpec {
    type Error = SpecParseError;

    fn try_from(text: String) -> std::result::Result<Self, Self::Error> {
        Self::parse(&text)
    }
}

impl From<OutputSpec> for String {
    fn from(spec: OutputSpec) -> Self {
        spec.to_string()
    }
}
