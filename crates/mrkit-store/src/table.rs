//! Table and instance traits, plus the row/cell value types they exchange.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Name and column families of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLayout {
    pub name: String,
    pub families: Vec<String>,
    #[serde(default)]
    pub description: String,
}

impl TableLayout {
    pub fn new(name: impl Into<String>, families: &[&str]) -> Self {
        Self {
            name: name.into(),
            families: families.iter().map(|f| f.to_string()).collect(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn has_family(&self, family: &str) -> bool {
        self.families.iter().any(|f| f == family)
    }

    /// Reject writes to families the layout does not declare.
    pub fn check_cells(&self, cells: &[Cell]) -> Result<()> {
        match cells.iter().find(|c| !self.has_family(&c.family)) {
            Some(cell) => Err(StoreError::UnknownFamily {
                table: self.name.clone(),
                family: cell.family.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// One value to write into a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub family: String,
    pub qualifier: String,
    pub value: Vec<u8>,
}

impl Cell {
    pub fn new(family: &str, qualifier: &str, value: impl Into<Vec<u8>>) -> Self {
        Self {
            family: family.to_string(),
            qualifier: qualifier.to_string(),
            value: value.into(),
        }
    }
}

/// The most recent value of every cell in one row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub key: String,
    pub cells: BTreeMap<String, BTreeMap<String, Vec<u8>>>,
}

impl Row {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            cells: BTreeMap::new(),
        }
    }

    /// Last-write-wins per cell.
    pub fn apply(&mut self, cells: &[Cell]) {
        for cell in cells {
            self.cells
                .entry(cell.family.clone())
                .or_default()
                .insert(cell.qualifier.clone(), cell.value.clone());
        }
    }

    pub fn contains(&self, family: &str, qualifier: &str) -> bool {
        self.get(family, qualifier).is_some()
    }

    pub fn get(&self, family: &str, qualifier: &str) -> Option<&[u8]> {
        self.cells
            .get(family)
            .and_then(|f| f.get(qualifier))
            .map(Vec::as_slice)
    }

    /// UTF-8 view of a cell; invalid text is reported as corruption.
    pub fn get_str(&self, family: &str, qualifier: &str) -> Result<Option<&str>> {
        match self.get(family, qualifier) {
            None => Ok(None),
            Some(bytes) => std::str::from_utf8(bytes).map(Some).map_err(|e| {
                StoreError::Corrupt(format!(
                    "row '{}' cell {family}:{qualifier} is not UTF-8: {e}",
                    self.key
                ))
            }),
        }
    }

    /// All cells of a family, in qualifier order.
    pub fn family(&self, family: &str) -> impl Iterator<Item = (&str, &[u8])> {
        self.cells
            .get(family)
            .into_iter()
            .flat_map(|f| f.iter().map(|(q, v)| (q.as_str(), v.as_slice())))
    }
}

/// A keyed, column-oriented table.
///
/// Every write is durable when the call returns. Rows are ordered by key.
pub trait Table: Send + Sync {
    fn name(&self) -> &str;

    fn layout(&self) -> &TableLayout;

    /// Write several cells of one row. Atomic per row.
    fn put_row(&self, row_key: &str, cells: &[Cell]) -> Result<()>;

    /// Read the latest value of every cell in a row; `None` if nothing was
    /// ever written under `row_key`.
    fn get(&self, row_key: &str) -> Result<Option<Row>>;

    /// Up to `limit` rows with keys strictly greater than `start_after`, in
    /// key order. An empty result means the scan is complete.
    fn scan(&self, start_after: Option<&str>, limit: usize) -> Result<Vec<Row>>;

    fn put(&self, row_key: &str, family: &str, qualifier: &str, value: &[u8]) -> Result<()> {
        self.put_row(row_key, &[Cell::new(family, qualifier, value)])
    }
}

/// A handle on the storage engine. Owns tables.
pub trait StorageInstance: Send + Sync {
    /// Address this instance was opened from.
    fn uri(&self) -> &str;

    fn table_exists(&self, name: &str) -> Result<bool>;

    /// Fails with `TableExists` when a table of that name is present.
    fn create_table(&self, layout: &TableLayout) -> Result<()>;

    /// Fails with `TableNotFound` when no such table exists.
    fn delete_table(&self, name: &str) -> Result<()>;

    fn open_table(&self, name: &str) -> Result<Arc<dyn Table>>;
}
