//! Job definitions.
//!
//! `JobDefinition` is what a caller (or a YAML job file) asks for: plain
//! strings, nothing validated. `prepare` turns it into a `PreparedJob`, parsing
//! the output and input strings and resolving the producer, so that every configuration
//! mistake is reported before a job is submitted.

use std::collections::BTreeMap;
use std::sync::Arc;

use mrkit_core::conf::keys;
use mrkit_core::{InputSpec, JobConf, OutputSpec};
use serde::{Deserialize, Serialize};

use crate::error::{ExecError, Result};
use crate::producer::{InputRow, Producer};
use crate::registry::Registry;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDefinition {
    /// Defaults to `mrkit-<producer>` when empty.
    #[serde(default)]
    pub name: String,

    pub producer: String,

    #[serde(default)]
    pub input: Vec<InputRow>,

    /// `format:location[,location...]`, recorded with the job.
    #[serde(default)]
    pub input_spec: Option<String>,

    /// `format:location@splits`.
    #[serde(default)]
    pub output: String,

    /// Extra configuration entries recorded with the job.
    #[serde(default)]
    pub conf: BTreeMap<String, String>,
}

impl JobDefinition {
    pub fn builder() -> JobDefinitionBuilder {
        JobDefinitionBuilder::default()
    }

    pub fn prepare(&self, registry: &Registry) -> Result<PreparedJob> {
        if self.producer.trim().is_empty() {
            return Err(ExecError::InvalidJob("no producer given".into()));
        }
        if self.output.trim().is_empty() {
            return Err(ExecError::InvalidJob("no output spec given".into()));
        }
        let output = OutputSpec::parse(&self.output)?;
        let input_spec = self
            .input_spec
            .as_deref()
            .map(InputSpec::parse)
            .transpose()?;
        let producer = registry.get(&self.producer)?;

        let name = if self.name.trim().is_empty() {
            format!("mrkit-{}", self.producer)
        } else {
            self.name.clone()
        };

        let mut conf: JobConf = self.conf.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        conf.set(keys::JOB_NAME, name.as_str())
            .set(keys::PRODUCER, producer.name())
            .set(keys::OUTPUT_SPEC, output.to_string())
            .set(keys::VERSION, mrkit_core::VERSION);
        if let Some(spec) = &input_spec {
            conf.set(keys::INPUT_SPEC, spec.to_string());
        }

        Ok(PreparedJob {
            name,
            producer,
            input: self.input.clone(),
            input_spec,
            output,
            conf,
        })
    }
}

/// Fluent construction of a `JobDefinition`.
#[derive(Debug, Clone, Default)]
pub struct JobDefinitionBuilder {
    def: JobDefinition,
}

impl JobDefinitionBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.def.name = name.into();
        self
    }

    pub fn producer(mut self, producer: impl Into<String>) -> Self {
        self.def.producer = producer.into();
        self
    }

    pub fn input(mut self, rows: impl IntoIterator<Item = InputRow>) -> Self {
        self.def.input.extend(rows);
        self
    }

    pub fn input_spec(mut self, spec: impl Into<String>) -> Self {
        self.def.input_spec = Some(spec.into());
        self
    }

    pub fn output(mut self, spec: impl Into<String>) -> Self {
        self.def.output = spec.into();
        self
    }

    pub fn conf(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.def.conf.insert(key.into(), value.into());
        self
    }

    pub fn build(self, registry: &Registry) -> Result<PreparedJob> {
        self.def.prepare(registry)
    }
}

/// A validated job, ready for `ExecutionEngine::submit`.
#[derive(Clone)]
pub struct PreparedJob {
    pub name: String,
    pub producer: Arc<dyn Producer>,
    pub input: Vec<InputRow>,
    pub input_spec: Option<InputSpec>,
    pub output: OutputSpec,
    /// Full configuration, including the `mrkit.*` entries.
    pub conf: JobConf,
}

impl std::fmt::Debug for PreparedJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedJob")
            .field("name", &self.name)
            .field("producer", &self.producer.name())
            .field("rows", &self.input.len())
            .field("output", &self.output.to_string())
            .finish()
    }
}
