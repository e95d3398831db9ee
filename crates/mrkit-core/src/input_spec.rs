//! Input descriptors: `format:location[,location...]`.
//!
//! Table-backed formats (`kiji`, `htable`) name exactly one table; file formats
//! accept any number of comma-separated paths.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ParseErrorKind, SpecParseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InputFormat {
    Kiji,
    HTable,
    Text,
    SmallTextFiles,
    SequenceFile,
    Avro,
    AvroKeyValue,
    Xml,
}

impl InputFormat {
    pub const ALL: [InputFormat; 8] = [
        InputFormat::Kiji,
        InputFormat::HTable,
        InputFormat::Text,
        InputFormat::SmallTextFiles,
        InputFormat::SequenceFile,
        InputFormat::Avro,
        InputFormat::AvroKeyValue,
        InputFormat::Xml,
    ];

    pub const fn token(self) -> &'static str {
        match self {
            InputFormat::Kiji => "kiji",
            InputFormat::HTable => "htable",
            InputFormat::Text => "text",
            InputFormat::SmallTextFiles => "small-text-files",
            InputFormat::SequenceFile => "seq",
            InputFormat::Avro => "avro",
            InputFormat::AvroKeyValue => "avrokv",
            InputFormat::Xml => "xml",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.token() == token)
    }

    /// True for formats that read a single table rather than a file set.
    pub const fn is_table(self) -> bool {
        matches!(self, InputFormat::Kiji | InputFormat::HTable)
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Serialized as its spec string; deserializing goes through `parse`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InputSpec {
    format: InputFormat,
    locations: Vec<String>,
}

impl InputSpec {
    pub fn parse(text: &str) -> Result<Self, SpecParseError> {
        let fail = |kind| SpecParseError::new(kind, text);

        let Some((format_token, rest)) = text.split_once(':') else {
            return Err(fail(ParseErrorKind::MissingLocation));
        };
        let format = InputFormat::from_token(format_token)
            .ok_or_else(|| fail(ParseErrorKind::UnknownFormat(format_token.to_string())))?;
        if rest.is_empty() {
            return Err(fail(ParseErrorKind::MissingLocation));
        }

        let locations: Vec<String> = rest.split(',').map(str::to_string).collect();
        if locations.iter().any(String::is_empty) {
            return Err(fail(ParseErrorKind::EmptyLocation));
        }
        if format.is_table() && locations.len() != 1 {
            return Err(fail(ParseErrorKind::TooManyLocations {
                format: format.token(),
                count: locations.len(),
            }));
        }

        Ok(Self { format, locations })
    }

    pub fn format(&self) -> InputFormat {
        self.format
    }

    pub fn locations(&self) -> &[String] {
        &self.locations
    }
}

impl fmt::Display for InputSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.format, self.locations.join(","))
    }
}

impl FromStr for InputSpec {
    type Err = SpecParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for InputSpec {
    type Error = SpecParseError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        Self::parse(&text)
    }
}

impl From<InputSpec> for String {
    fn from(spec: InputSpec) -> Self {
        spec.to_string()
    }
}
