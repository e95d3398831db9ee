//! Job counters and their text form.
//!
//! Stored as a JSON object sorted by name, so any counter name survives:
//!
//! ```text
//! {"PRODUCER_ROWS_EMITTED":12,"PRODUCER_ROWS_PROCESSED":40}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counters(BTreeMap<String, i64>);

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, name: &str, by: i64) {
        *self.0.entry(name.to_string()).or_insert(0) += by;
    }

    pub fn set(&mut self, name: impl Into<String>, value: i64) {
        self.0.insert(name.into(), value);
    }

    /// Missing counters read as zero.
    pub fn get(&self, name: &str) -> i64 {
        self.0.get(name).copied().unwrap_or(0)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn merge(&mut self, other: &Counters) {
        for (name, value) in &other.0 {
            self.increment(name, *value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Text blob stored in the history table: a JSON object keyed by name.
    pub fn to_text(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_text(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

impl FromIterator<(String, i64)> for Counters {
    fn from_iter<I: IntoIterator<Item = (String, i64)>>(iter: I) -> Self {
        Counters(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_form_is_sorted_json() {
        let mut c = Counters::new();
        c.increment("PRODUCER_ROWS_PROCESSED", 3);
        c.increment("PRODUCER_ROWS_EMITTED", 2);
        c.increment("PRODUCER_ROWS_PROCESSED", 1);
        let text = c.to_text().unwrap();
        assert_eq!(
            text,
            r#"{"PRODUCER_ROWS_EMITTED":2,"PRODUCER_ROWS_PROCESSED":4}"#
        );
        assert_eq!(Counters::from_text(&text).unwrap(), c);
    }

    #[test]
    fn awkward_names_survive_the_text_form() {
        let mut c = Counters::new();
        c.set("bytes=written", 5);
        c.set("multi\nline", 1);
        c.set("  padded  ", -2);
        let back = Counters::from_text(&c.to_text().unwrap()).unwrap();
        assert_eq!(back, c);
        assert_eq!(back.get("bytes=written"), 5);
        assert_eq!(back.get("  padded  "), -2);
    }

    #[test]
    fn from_text_rejects_malformed_blobs() {
        assert!(Counters::from_text("ROWS=1").is_err());
        assert!(Counters::from_text(r#"{"ROWS":"many"}"#).is_err());
        assert!(Counters::from_text("{}").unwrap().is_empty());
    }

    #[test]
    fn missing_counter_reads_zero() {
        let c = Counters::new();
        assert_eq!(c.get("NOPE"), 0);
        assert!(!c.contains("NOPE"));
    }
}
