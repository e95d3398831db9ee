//! YAML job files.
//!
//! ```yaml
//! config:
//!   store_uri: "file:///var/lib/mrkit"
//!   wait_timeout_ms: 60000
//! job:
//!   name: "email-domains"
//!   producer: "email-domain"
//!   input_spec: "kiji:kiji://.env/default/users"
//!   output: "text:out/domains@2"
//!   conf:
//!     conf.test.animal.string: "squirrel"
//!   input:
//!     - key: "u1"
//!       columns: { "info:email": "ann@example.org" }
//! ```

use mrkit_core::HistoryConfig;
use serde::{Deserialize, Serialize};

use crate::job::JobDefinition;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobFile {
    #[serde(default)]
    pub config: Option<JobFileConfig>,
    pub job: JobDefinition,
}

/// History settings a job file may carry. Unset fields keep the value
/// already in the `HistoryConfig`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobFileConfig {
    pub store_uri: Option<String>,
    pub table_name: Option<String>,
    pub scan_batch: Option<usize>,
    pub wait_timeout_ms: Option<u64>,
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct ParsedJob {
    pub job: JobDefinition,
    pub config: JobFileConfig,
}

pub fn parse_yaml_job(yaml_src: &str) -> Result<ParsedJob, serde_yaml::Error> {
    let doc: JobFile = serde_yaml::from_str(yaml_src)?;
    Ok(ParsedJob {
        job: doc.job,
        config: doc.config.unwrap_or_default(),
    })
}

/// Layer job-file settings over `cfg` (environment defaults).
pub fn apply_job_config(cfg: &mut HistoryConfig, doc: &JobFileConfig) {
    if let Some(uri) = &doc.store_uri {
        cfg.store_uri = Some(uri.clone());
    }
    if let Some(table) = &doc.table_name {
        cfg.table_name = table.clone();
    }
    if let Some(batch) = doc.scan_batch {
        cfg.scan_batch = batch.max(1);
    }
    if let Some(ms) = doc.wait_timeout_ms {
        cfg.wait_timeout_ms = ms;
    }
    if let Some(enabled) = doc.enabled {
        cfg.enabled = enabled;
    }
}
