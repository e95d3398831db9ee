//! Job configuration snapshot.
//!
//! A flat, ordered string map. The history store keeps its JSON text form in
//! the `configuration` column so the full job setup can be inspected later.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Well-known configuration keys written by the job-submission layer.
pub mod keys {
    pub const JOB_NAME: &str = "mrkit.job.name";
    pub const PRODUCER: &str = "mrkit.producer";
    pub const OUTPUT_SPEC: &str = "mrkit.output.spec";
    pub const INPUT_SPEC: &str = "mrkit.input.spec";
    pub const VERSION: &str = "mrkit.version";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobConf(BTreeMap<String, String>);

impl JobConf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Text blob stored in the history table.
    pub fn to_text(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_text(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for JobConf {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        JobConf(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
