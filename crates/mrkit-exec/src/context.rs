//! Explicit run context threaded through the job-submission layer.

use std::sync::Arc;
use std::time::Duration;

use mrkit_core::HistoryConfig;
use mrkit_history::JobHistoryStore;
use mrkit_store::StorageInstance;
use tracing::warn;

/// Configuration plus the (optional) history store jobs are recorded in.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    config: HistoryConfig,
    history: Option<JobHistoryStore>,
}

impl RunContext {
    /// A context that records nothing.
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            config,
            history: None,
        }
    }

    /// Open the history table named by `config` in `instance`.
    ///
    /// A missing table or unreachable instance is logged and leaves the
    /// context without history; jobs still run.
    pub fn connect(config: HistoryConfig, instance: Arc<dyn StorageInstance>) -> Self {
        let history = if config.enabled {
            match JobHistoryStore::open(instance, &config) {
                Ok(store) => Some(store),
                Err(e) => {
                    warn!(error = %e, "job history unavailable; jobs will not be recorded");
                    None
                }
            }
        } else {
            None
        };
        Self { config, history }
    }

    /// Like `connect`, resolving the instance from `config.store_uri`.
    pub fn from_config(config: HistoryConfig) -> Self {
        let Some(uri) = config.store_uri.clone() else {
            return Self::new(config);
        };
        match mrkit_store::open_instance(&uri) {
            Ok(instance) => Self::connect(config, instance),
            Err(e) => {
                warn!(uri = %uri, error = %e, "cannot open storage instance; jobs will not be recorded");
                Self::new(config)
            }
        }
    }

    pub fn with_history(mut self, store: JobHistoryStore) -> Self {
        self.history = Some(store);
        self
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// The history store, unless recording is disabled.
    pub fn history(&self) -> Option<&JobHistoryStore> {
        self.history.as_ref().filter(|_| self.config.enabled)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.config.wait_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrkit_store::MemoryInstance;

    #[test]
    fn missing_table_leaves_history_off() {
        let ctx = RunContext::connect(HistoryConfig::default(), Arc::new(MemoryInstance::new()));
        assert!(ctx.history().is_none());
    }

    #[test]
    fn disabled_config_hides_history() {
        let mem = Arc::new(MemoryInstance::new());
        let store = JobHistoryStore::ensure_installed(mem, &HistoryConfig::default()).unwrap();
        let cfg = HistoryConfig {
            enabled: false,
            ..HistoryConfig::default()
        };
        assert!(RunContext::new(cfg).with_history(store).history().is_none());
    }

    #[test]
    fn installed_table_is_used() {
        let mem = Arc::new(MemoryInstance::new());
        JobHistoryStore::install(mem.as_ref(), "job_history").unwrap();
        let ctx = RunContext::connect(HistoryConfig::default(), mem);
        assert_eq!(ctx.history().map(|h| h.table_name()), Some("job_history"));
    }
}
