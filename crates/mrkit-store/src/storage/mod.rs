//! Storage instance builders.
//!
//! - `fs`: Local filesystem (default for paths and `file://` URIs).
//! - `memory://`: a fresh in-process `MemoryInstance`.
//!
//! Any other scheme is rejected.

mod fs;
pub use fs::FsInstance;

use std::sync::Arc;

use mrkit_core::config::uri_scheme;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::memory_storage::MemoryInstance;
use crate::table::StorageInstance;

/// Open the storage instance addressed by `uri`.
pub fn open_instance(uri: &str) -> Result<Arc<dyn StorageInstance>> {
    let uri = uri.trim();
    match uri_scheme(uri) {
        Some("memory") => {
            debug!(uri, "opening in-memory storage instance");
            Ok(Arc::new(MemoryInstance::with_uri(uri)))
        }
        Some("file") => {
            let path = file_uri_to_path(uri)?;
            Ok(Arc::new(FsInstance::open(path)?))
        }
        None if !uri.is_empty() => Ok(Arc::new(FsInstance::open(uri)?)),
        None => Err(StoreError::Unavailable(
            "no storage instance address given".into(),
        )),
        Some(other) => Err(StoreError::UnsupportedScheme(other.to_string())),
    }
}

fn file_uri_to_path(uri: &str) -> Result<String> {
    let parsed = url::Url::parse(uri)
        .map_err(|e| StoreError::Unavailable(format!("bad storage uri '{uri}': {e}")))?;
    let path = parsed
        .to_file_path()
        .map_err(|_| StoreError::Unavailable(format!("'{uri}' is not a local file uri")))?;
    Ok(path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_scheme_opens_fresh_instance() {
        let instance = open_instance("memory://unit").unwrap();
        assert_eq!(instance.uri(), "memory://unit");
        assert!(!instance.table_exists("job_history").unwrap());
    }

    #[test]
    fn unknown_scheme_is_rejected() {
        let err = open_instance("hbase://zk:2181/default").err().unwrap();
        assert!(err.to_string().contains("unsupported storage scheme"));
    }

    #[test]
    fn empty_address_is_unavailable() {
        let err = open_instance("  ").err().unwrap();
        assert!(err.is_unavailable());
    }

    #[test]
    fn file_uri_maps_to_path() {
        assert_eq!(
            file_uri_to_path("file:///tmp/mrkit-store").unwrap(),
            "/tmp/mrkit-store"
        );
    }
}
