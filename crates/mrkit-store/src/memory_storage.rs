//! In-memory storage backend for testing.
//!
//! Provides a BTreeMap-based instance that implements `StorageInstance`.
//! Used for the `memory://` URI scheme and in tests to avoid file I/O. The
//! instance can be taken offline to simulate an unreachable storage engine.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Result, StoreError};
use crate::table::{Cell, Row, StorageInstance, Table, TableLayout};

struct MemTable {
    layout: TableLayout,
    rows: BTreeMap<String, Row>,
}

struct Inner {
    uri: String,
    online: AtomicBool,
    tables: Mutex<BTreeMap<String, MemTable>>,
}

/// Thread-safe in-memory storage instance. Clones share the same tables.
#[derive(Clone)]
pub struct MemoryInstance {
    inner: Arc<Inner>,
}

impl MemoryInstance {
    pub fn new() -> Self {
        Self::with_uri("memory://")
    }

    pub fn with_uri(uri: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                uri: uri.into(),
                online: AtomicBool::new(true),
                tables: Mutex::new(BTreeMap::new()),
            }),
        }
    }

    /// Simulate an outage (`false`) or recovery (`true`).
    pub fn set_online(&self, online: bool) {
        self.inner.online.store(online, Ordering::SeqCst);
    }

    pub fn is_online(&self) -> bool {
        self.inner.online.load(Ordering::SeqCst)
    }

    /// Number of rows in a table.
    pub fn row_count(&self, table: &str) -> Result<usize> {
        let tables = self.lock()?;
        tables
            .get(table)
            .map(|t| t.rows.len())
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, MemTable>>> {
        if !self.is_online() {
            return Err(StoreError::Unavailable(format!(
                "{} is offline",
                self.inner.uri
            )));
        }
        self.inner
            .tables
            .lock()
            .map_err(|_| StoreError::Unavailable("memory instance lock poisoned".into()))
    }
}

impl Default for MemoryInstance {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageInstance for MemoryInstance {
    fn uri(&self) -> &str {
        &self.inner.uri
    }

    fn table_exists(&self, name: &str) -> Result<bool> {
        Ok(self.lock()?.contains_key(name))
    }

    fn create_table(&self, layout: &TableLayout) -> Result<()> {
        let mut tables = self.lock()?;
        if tables.contains_key(&layout.name) {
            return Err(StoreError::TableExists(layout.name.clone()));
        }
        tables.insert(
            layout.name.clone(),
            MemTable {
                layout: layout.clone(),
                rows: BTreeMap::new(),
            },
        );
        Ok(())
    }

    fn delete_table(&self, name: &str) -> Result<()> {
        self.lock()?
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::TableNotFound(name.to_string()))
    }

    fn open_table(&self, name: &str) -> Result<Arc<dyn Table>> {
        let tables = self.lock()?;
        let table = tables
            .get(name)
            .ok_or_else(|| StoreError::TableNotFound(name.to_string()))?;
        Ok(Arc::new(MemoryTable {
            instance: self.clone(),
            layout: table.layout.clone(),
        }))
    }
}

/// Table handle. Every call re-resolves the table, so a handle on a deleted
/// table reports `TableNotFound`.
struct MemoryTable {
    instance: MemoryInstance,
    layout: TableLayout,
}

impl MemoryTable {
    fn with_table<T>(&self, f: impl FnOnce(&mut MemTable) -> Result<T>) -> Result<T> {
        let mut tables = self.instance.lock()?;
        let table = tables
            .get_mut(&self.layout.name)
            .ok_or_else(|| StoreError::TableNotFound(self.layout.name.clone()))?;
        f(table)
    }
}

impl Table for MemoryTable {
    fn name(&self) -> &str {
        &self.layout.name
    }

    fn layout(&self) -> &TableLayout {
        &self.layout
    }

    fn put_row(&self, row_key: &str, cells: &[Cell]) -> Result<()> {
        self.layout.check_cells(cells)?;
        self.with_table(|t| {
            t.rows
                .entry(row_key.to_string())
                .or_insert_with(|| Row::new(row_key))
                .apply(cells);
            Ok(())
        })
    }

    fn get(&self, row_key: &str) -> Result<Option<Row>> {
        self.with_table(|t| Ok(t.rows.get(row_key).cloned()))
    }

    fn scan(&self, start_after: Option<&str>, limit: usize) -> Result<Vec<Row>> {
        use std::ops::Bound;

        let lower = match start_after {
            Some(key) => Bound::Excluded(key.to_string()),
            None => Bound::Unbounded,
        };
        self.with_table(|t| {
            Ok(t.rows
                .range((lower, Bound::Unbounded))
                .take(limit)
                .map(|(_, row)| row.clone())
                .collect())
        })
    }
}
