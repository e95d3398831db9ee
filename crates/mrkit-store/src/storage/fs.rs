use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::table::{Cell, Row, StorageInstance, Table, TableLayout};

const LAYOUT_FILE: &str = "_layout.json";
const ROWS_DIR: &str = "rows";
const ROW_EXT: &str = "json";

/// Local filesystem storage instance.
///
/// ```text
/// <root>/<table>/_layout.json
/// <root>/<table>/rows/<hex(row key)>.json
/// ```
///
/// Row files are named by the hex encoding of the row key, so sorting file
/// names sorts rows by key. Writes go through a temp file and a rename.
#[derive(Debug, Clone)]
pub struct FsInstance {
    uri: String,
    root: PathBuf,
    // Serializes read-modify-write of row files within this process.
    write_lock: Arc<Mutex<()>>,
}

impl FsInstance {
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| {
            StoreError::Unavailable(format!("cannot open {}: {e}", root.display()))
        })?;
        Ok(Self {
            uri: format!("file://{}", root.display()),
            root,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn table_dir(&self, name: &str) -> Result<PathBuf> {
        self.check_root()?;
        if !valid_table_name(name) {
            return Err(StoreError::Io(format!("invalid table name '{name}'")));
        }
        Ok(self.root.join(name))
    }

    fn check_root(&self) -> Result<()> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(StoreError::Unavailable(format!(
                "storage root {} is missing",
                self.root.display()
            )))
        }
    }
}

fn valid_table_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
}

impl StorageInstance for FsInstance {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn table_exists(&self, name: &str) -> Result<bool> {
        Ok(self.table_dir(name)?.join(LAYOUT_FILE).is_file())
    }

    fn create_table(&self, layout: &TableLayout) -> Result<()> {
        let dir = self.table_dir(&layout.name)?;
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("fs instance lock poisoned".into()))?;
        if dir.join(LAYOUT_FILE).is_file() {
            return Err(StoreError::TableExists(layout.name.clone()));
        }
        fs::create_dir_all(dir.join(ROWS_DIR))?;
        write_atomic(&dir.join(LAYOUT_FILE), &serde_json::to_vec_pretty(layout)?)?;
        debug!(table = %layout.name, root = %self.root.display(), "created table");
        Ok(())
    }

    fn delete_table(&self, name: &str) -> Result<()> {
        let dir = self.table_dir(name)?;
        if !dir.join(LAYOUT_FILE).is_file() {
            return Err(StoreError::TableNotFound(name.to_string()));
        }
        fs::remove_dir_all(&dir)?;
        Ok(())
    }

    fn open_table(&self, name: &str) -> Result<Arc<dyn Table>> {
        let dir = self.table_dir(name)?;
        let layout_path = dir.join(LAYOUT_FILE);
        if !layout_path.is_file() {
            return Err(StoreError::TableNotFound(name.to_string()));
        }
        let layout: TableLayout = serde_json::from_slice(&fs::read(&layout_path)?)?;
        Ok(Arc::new(FsTable {
            dir,
            layout,
            write_lock: Arc::clone(&self.write_lock),
        }))
    }
}

/// On-disk form of a row. Values are hex-encoded bytes.
#[derive(Debug, Serialize, Deserialize)]
struct RowFile {
    key: String,
    cells: BTreeMap<String, BTreeMap<String, String>>,
}

impl RowFile {
    fn from_row(row: &Row) -> Self {
        Self {
            key: row.key.clone(),
            cells: row
                .cells
                .iter()
                .map(|(family, cols)| {
                    let cols = cols.iter().map(|(q, v)| (q.clone(), hex_encode(v))).collect();
                    (family.clone(), cols)
                })
                .collect(),
        }
    }

    fn into_row(self) -> Result<Row> {
        let mut row = Row::new(self.key);
        for (family, cols) in self.cells {
            let mut decoded = BTreeMap::new();
            for (qualifier, hex) in cols {
                let value = hex_decode(&hex).ok_or_else(|| {
                    StoreError::Corrupt(format!(
                        "row '{}' cell {family}:{qualifier} is not valid hex",
                        row.key
                    ))
                })?;
                decoded.insert(qualifier, value);
            }
            row.cells.insert(family, decoded);
        }
        Ok(row)
    }
}

struct FsTable {
    dir: PathBuf,
    layout: TableLayout,
    write_lock: Arc<Mutex<()>>,
}

impl FsTable {
    fn rows_dir(&self) -> Result<PathBuf> {
        if !self.dir.join(LAYOUT_FILE).is_file() {
            return Err(StoreError::TableNotFound(self.layout.name.clone()));
        }
        Ok(self.dir.join(ROWS_DIR))
    }

    fn row_path(&self, row_key: &str) -> Result<PathBuf> {
        Ok(self
            .rows_dir()?
            .join(format!("{}.{ROW_EXT}", hex_encode(row_key.as_bytes()))))
    }

    fn read_row(path: &Path) -> Result<Option<Row>> {
        match fs::read(path) {
            Ok(bytes) => {
                let file: RowFile = serde_json::from_slice(&bytes)?;
                Ok(Some(file.into_row()?))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl Table for FsTable {
    fn name(&self) -> &str {
        &self.layout.name
    }

    fn layout(&self) -> &TableLayout {
        &self.layout
    }

    fn put_row(&self, row_key: &str, cells: &[Cell]) -> Result<()> {
        self.layout.check_cells(cells)?;
        let path = self.row_path(row_key)?;
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("fs instance lock poisoned".into()))?;
        let mut row = Self::read_row(&path)?.unwrap_or_else(|| Row::new(row_key));
        row.apply(cells);
        write_atomic(&path, &serde_json::to_vec(&RowFile::from_row(&row))?)
    }

    fn get(&self, row_key: &str) -> Result<Option<Row>> {
        Self::read_row(&self.row_path(row_key)?)
    }

    fn scan(&self, start_after: Option<&str>, limit: usize) -> Result<Vec<Row>> {
        let rows_dir = self.rows_dir()?;
        let mut keys = Vec::new();
        for entry in fs::read_dir(&rows_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ROW_EXT) {
                continue;
            }
            let Some(key) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(hex_decode)
                .and_then(|b| String::from_utf8(b).ok())
            else {
                continue;
            };
            if start_after.map_or(true, |after| key.as_str() > after) {
                keys.push((key, path));
            }
        }
        keys.sort_by(|a, b| a.0.cmp(&b.0));

        let mut rows = Vec::with_capacity(limit.min(keys.len()));
        for (_, path) in keys.into_iter().take(limit) {
            // A row deleted between listing and reading is skipped.
            if let Some(row) = Self::read_row(&path)? {
                rows.push(row);
            }
        }
        Ok(rows)
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    let mut f = File::create(&tmp)?;
    f.write_all(bytes)?;
    f.sync_all()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(&mut s, "{:02x}", b);
    }
    s
}

fn hex_decode(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| s.get(i..i + 2).and_then(|h| u8::from_str_radix(h, 16).ok()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root(name: &str) -> PathBuf {
        let mut dir = std::env::temp_dir();
        dir.push(format!("mrkit-fs-store-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn hex_round_trip() {
        let bytes = b"job_201301010000_0001\xff";
        assert_eq!(hex_decode(&hex_encode(bytes)).unwrap(), bytes);
        assert!(hex_decode("abc").is_none());
        assert!(hex_decode("zz").is_none());
    }

    #[test]
    fn rows_survive_reopen() {
        let root = temp_root("reopen");
        {
            let instance = FsInstance::open(&root).unwrap();
            instance
                .create_table(&TableLayout::new("t", &["info"]))
                .unwrap();
            let table = instance.open_table("t").unwrap();
            table.put("b", "info", "v", b"2").unwrap();
            table.put("a", "info", "v", b"1").unwrap();
            table.put("a", "info", "w", b"x").unwrap();
        }

        let instance = FsInstance::open(&root).unwrap();
        let table = instance.open_table("t").unwrap();
        let row = table.get("a").unwrap().unwrap();
        assert_eq!(row.get("info", "v"), Some(&b"1"[..]));
        assert_eq!(row.get("info", "w"), Some(&b"x"[..]));

        let keys: Vec<String> = table
            .scan(None, 10)
            .unwrap()
            .into_iter()
            .map(|r| r.key)
            .collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(table.scan(Some("a"), 10).unwrap().len(), 1);
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn missing_table_and_bad_names() {
        let root = temp_root("missing");
        let instance = FsInstance::open(&root).unwrap();
        assert!(!instance.table_exists("nope").unwrap());
        assert!(matches!(
            instance.open_table("nope"),
            Err(StoreError::TableNotFound(_))
        ));
        assert!(instance.table_exists("../escape").is_err());
        let _ = fs::remove_dir_all(&root);
    }
}
