#![forbid(unsafe_code)]
//! mrkit-store: the structured-storage engine the history store is built on.
//!
//! The engine itself is an external collaborator; this crate fixes the small
//! surface mrkit needs from it (`StorageInstance` owns tables, `Table` reads
//! and writes rows of family/qualifier cells) and ships two backends:
//!
//! - `memory_storage`: `MemoryInstance`, for tests and `memory://` URIs. Can be
//!   switched offline to simulate an unreachable engine.
//! - `storage::fs`: `FsInstance`, one directory per table and one JSON file
//!   per row, for `file://` URIs and bare paths.

pub mod error;
pub mod memory_storage;
pub mod storage;
pub mod table;

pub use error::{Result, StoreError};
pub use memory_storage::MemoryInstance;
pub use storage::{open_instance, FsInstance};
pub use table::{Cell, Row, StorageInstance, Table, TableLayout};
