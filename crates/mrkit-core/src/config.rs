//! History/runtime configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Storage instance address (`memory://`, `file:///path`, or a bare path).
    /// `None` disables history recording.
    pub store_uri: Option<String>,

    /// Name of the history table inside the storage instance.
    pub table_name: String,

    /// Rows fetched per page when enumerating the history table.
    pub scan_batch: usize,

    /// Upper bound for `JobRunner::run` waiting on a submitted job.
    pub wait_timeout_ms: u64,

    /// Master switch for staging/finalizing records.
    pub enabled: bool,
}

pub const DEFAULT_TABLE_NAME: &str = "job_history";

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            store_uri: None,
            table_name: DEFAULT_TABLE_NAME.to_string(),
            scan_batch: 64,
            wait_timeout_ms: 10 * 60 * 1000,
            enabled: true,
        }
    }
}

impl HistoryConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    ///
    /// - `MRKIT_STORE_URI`: storage instance address
    /// - `MRKIT_HISTORY_TABLE`: history table name
    /// - `MRKIT_HISTORY_SCAN_BATCH`: rows per scan page
    /// - `MRKIT_WAIT_TIMEOUT_MS`: job wait timeout
    /// - `MRKIT_HISTORY_ENABLED`: `0`/`false` turns recording off
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();

        if let Some(s) = lookup("MRKIT_STORE_URI") {
            if !s.trim().is_empty() {
                cfg.store_uri = Some(s.trim().to_string());
            }
        }

        if let Some(s) = lookup("MRKIT_HISTORY_TABLE") {
            if !s.trim().is_empty() {
                cfg.table_name = s.trim().to_string();
            }
        }

        if let Some(s) = lookup("MRKIT_HISTORY_SCAN_BATCH") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.scan_batch = v.max(1);
            }
        }

        if let Some(s) = lookup("MRKIT_WAIT_TIMEOUT_MS") {
            if let Ok(v) = s.parse::<u64>() {
                cfg.wait_timeout_ms = v;
            }
        }

        if let Some(s) = lookup("MRKIT_HISTORY_ENABLED") {
            cfg.enabled = !matches!(s.trim(), "0" | "false" | "no" | "off");
        }

        cfg
    }
}

pub fn uri_scheme(uri: &str) -> Option<&str> {
    uri.split_once("://")
        .map(|(scheme, _)| scheme.trim())
        .filter(|s| !s.is_empty())
}
