//! Producer capability interface.
//!
//! A producer reads a few columns of one input row and emits zero or more
//! values into a single output column. The engine calls `produce` once per
//! row, in row order, with a fresh `ProducerContext`.

use std::collections::BTreeMap;

use mrkit_core::Counters;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Counters maintained by the engine for every producer job.
pub mod counters {
    pub const ROWS_PROCESSED: &str = "PRODUCER_ROWS_PROCESSED";
    pub const ROWS_EMITTED: &str = "PRODUCER_ROWS_EMITTED";
    pub const ROWS_SKIPPED: &str = "PRODUCER_ROWS_SKIPPED";
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct ProduceError(pub String);

impl ProduceError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Columns a producer reads, as `family:qualifier` names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataRequest {
    columns: Vec<String>,
}

impl DataRequest {
    pub fn create(family: &str, qualifier: &str) -> Self {
        Self::default().with_column(family, qualifier)
    }

    pub fn with_column(mut self, family: &str, qualifier: &str) -> Self {
        self.columns.push(format!("{family}:{qualifier}"));
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// One input row: a key plus `family:qualifier` → value cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRow {
    pub key: String,
    #[serde(default)]
    pub columns: BTreeMap<String, String>,
}

impl InputRow {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            columns: BTreeMap::new(),
        }
    }

    pub fn with(mut self, column: &str, value: impl Into<String>) -> Self {
        self.columns.insert(column.to_string(), value.into());
        self
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns.get(column).map(String::as_str)
    }

    /// Copy of this row restricted to the requested columns.
    pub fn project(&self, request: &DataRequest) -> InputRow {
        let columns = request
            .columns()
            .iter()
            .filter_map(|c| self.columns.get(c).map(|v| (c.clone(), v.clone())))
            .collect();
        InputRow {
            key: self.key.clone(),
            columns,
        }
    }
}

/// Per-row sink for emitted values and user counters.
#[derive(Debug, Default)]
pub struct ProducerContext {
    emitted: Vec<String>,
    counters: Counters,
}

impl ProducerContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit one value for the current row.
    pub fn put(&mut self, value: impl Into<String>) {
        self.emitted.push(value.into());
    }

    pub fn increment(&mut self, counter: &str, by: i64) {
        self.counters.increment(counter, by);
    }

    pub fn emitted(&self) -> &[String] {
        &self.emitted
    }

    pub fn into_parts(self) -> (Vec<String>, Counters) {
        (self.emitted, self.counters)
    }
}

pub trait Producer: Send + Sync + 'static {
    /// Stable registry name.
    fn name(&self) -> &'static str;

    fn data_request(&self) -> DataRequest;

    /// `family:qualifier` the emitted values are written to.
    fn output_column(&self) -> &str;

    fn produce(&self, input: &InputRow, ctx: &mut ProducerContext) -> Result<(), ProduceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_keeps_requested_columns() {
        let row = InputRow::new("u1")
            .with("info:email", "a@b.org")
            .with("info:name", "Ann");
        let projected = row.project(&DataRequest::create("info", "email"));
        assert_eq!(projected.key, "u1");
        assert_eq!(projected.get("info:email"), Some("a@b.org"));
        assert!(!projected.contains("info:name"));
    }

    #[test]
    fn context_collects_values_and_counters() {
        let mut ctx = ProducerContext::new();
        ctx.put("x");
        ctx.put("y");
        ctx.increment("BAD_EMAIL", 1);
        let (values, counters) = ctx.into_parts();
        assert_eq!(values, ["x", "y"]);
        assert_eq!(counters.get("BAD_EMAIL"), 1);
    }
}
