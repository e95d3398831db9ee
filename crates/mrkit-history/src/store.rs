//! The job history table.

use std::sync::Arc;

use mrkit_core::{Counters, HistoryConfig, JobEndStatus, JobId, JobRecord};
use mrkit_store::{Cell, Row, StorageInstance, StoreError, Table};
use tracing::{debug, info};

use crate::error::{HistoryError, Result};
use crate::layout::{self, EXTENDED_FAMILY, INFO_FAMILY};

/// Durable per-job history records.
///
/// Writes go straight to the table. Staging and finalizing different job ids
/// from several threads is safe; the table serializes per-row writes.
#[derive(Clone)]
pub struct JobHistoryStore {
    instance: Arc<dyn StorageInstance>,
    table: Arc<dyn Table>,
    scan_batch: usize,
}

impl std::fmt::Debug for JobHistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobHistoryStore")
            .field("instance", &self.instance.uri())
            .field("table", &self.table.name())
            .field("scan_batch", &self.scan_batch)
            .finish()
    }
}

impl JobHistoryStore {
    /// Create the history table unless it already exists.
    ///
    /// Returns `true` when this call created the table. An existing table is
    /// left untouched, including one created concurrently by another caller.
    pub fn install(instance: &dyn StorageInstance, table_name: &str) -> Result<bool> {
        if instance.table_exists(table_name)? {
            debug!(table = table_name, "history table already installed");
            return Ok(false);
        }
        match instance.create_table(&layout::history_layout(table_name)) {
            Ok(()) => {
                info!(table = table_name, uri = instance.uri(), "installed job history table");
                Ok(true)
            }
            Err(StoreError::TableExists(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Install the table if needed, then open it.
    pub fn ensure_installed(instance: Arc<dyn StorageInstance>, cfg: &HistoryConfig) -> Result<Self> {
        Self::install(instance.as_ref(), &cfg.table_name)?;
        Self::open(instance, cfg)
    }

    /// Open an installed history table. A missing table is reported as
    /// `StorageUnavailable`.
    pub fn open(instance: Arc<dyn StorageInstance>, cfg: &HistoryConfig) -> Result<Self> {
        let table = instance.open_table(&cfg.table_name)?;
        Ok(Self {
            instance,
            table,
            scan_batch: cfg.scan_batch.max(1),
        })
    }

    pub fn table_name(&self) -> &str {
        self.table.name()
    }

    pub fn instance(&self) -> &Arc<dyn StorageInstance> {
        &self.instance
    }

    /// Record the start of a job. Re-staging overwrites the same cells.
    pub fn stage(
        &self,
        job_id: &JobId,
        job_name: &str,
        start_time: u64,
        configuration: &str,
    ) -> Result<()> {
        let cells = [
            Cell::new(INFO_FAMILY, layout::JOB_ID, job_id.as_str()),
            Cell::new(INFO_FAMILY, layout::JOB_NAME, job_name),
            Cell::new(INFO_FAMILY, layout::START_TIME, start_time.to_string()),
            Cell::new(INFO_FAMILY, layout::CONFIGURATION, configuration),
        ];
        self.table.put_row(job_id.as_str(), &cells)?;
        debug!(job_id = %job_id, job_name, start_time, "staged job history record");
        Ok(())
    }

    /// Record the end of a job.
    ///
    /// An id that was never staged gets a partial record holding only the
    /// terminal fields and the id.
    pub fn finalize(
        &self,
        job_id: &JobId,
        end_time: u64,
        status: JobEndStatus,
        counters: &Counters,
    ) -> Result<()> {
        let cells = [
            Cell::new(INFO_FAMILY, layout::JOB_ID, job_id.as_str()),
            Cell::new(INFO_FAMILY, layout::END_TIME, end_time.to_string()),
            Cell::new(INFO_FAMILY, layout::END_STATUS, status.as_str()),
            Cell::new(INFO_FAMILY, layout::COUNTERS, counters.to_text()?),
        ];
        self.table.put_row(job_id.as_str(), &cells)?;
        debug!(job_id = %job_id, end_time, status = %status, "finalized job history record");
        Ok(())
    }

    /// Attach one free-form key/value to a job's record.
    pub fn put_extension(&self, job_id: &JobId, key: &str, value: &str) -> Result<()> {
        self.table
            .put(job_id.as_str(), EXTENDED_FAMILY, key, value.as_bytes())?;
        Ok(())
    }

    pub fn get_job_details(&self, job_id: &JobId) -> Result<JobRecord> {
        match self.table.get(job_id.as_str())? {
            Some(row) => decode_row(&row),
            None => Err(HistoryError::RecordNotFound(job_id.to_string())),
        }
    }

    /// Every record in row-key order. Each call starts a new scan.
    pub fn get_all(&self) -> JobRecords {
        JobRecords {
            table: Arc::clone(&self.table),
            batch: self.scan_batch,
            page: Vec::new().into_iter(),
            last_key: None,
            done: false,
        }
    }
}

/// Lazy iterator over the history table, one scan page at a time.
///
/// A row that does not decode yields `Corrupt` and iteration moves on to the
/// next row. A failed scan ends the iteration.
pub struct JobRecords {
    table: Arc<dyn Table>,
    batch: usize,
    page: std::vec::IntoIter<Row>,
    last_key: Option<String>,
    done: bool,
}

impl JobRecords {
    fn fill(&mut self) -> Result<bool> {
        let rows = self.table.scan(self.last_key.as_deref(), self.batch)?;
        if rows.is_empty() {
            return Ok(false);
        }
        self.last_key = rows.last().map(|r| r.key.clone());
        self.page = rows.into_iter();
        Ok(true)
    }
}

impl Iterator for JobRecords {
    type Item = Result<JobRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            if let Some(row) = self.page.next() {
                return Some(decode_row(&row));
            }
            match self.fill() {
                Ok(true) => continue,
                Ok(false) => {
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl std::iter::FusedIterator for JobRecords {}

/// Build a `JobRecord` from a history row. Unwritten cells stay `None`.
pub fn decode_row(row: &Row) -> Result<JobRecord> {
    let mut rec = JobRecord::new(JobId::new(row.key.clone()));
    rec.job_name = info_text(row, layout::JOB_NAME)?.map(str::to_string);
    rec.start_time = info_millis(row, layout::START_TIME)?;
    rec.end_time = info_millis(row, layout::END_TIME)?;
    rec.end_status = info_text(row, layout::END_STATUS)?
        .map(|s| s.parse::<JobEndStatus>())
        .transpose()
        .map_err(|e| corrupt(row, e.to_string()))?;
    rec.counters = info_text(row, layout::COUNTERS)?
        .map(Counters::from_text)
        .transpose()
        .map_err(|e| corrupt(row, e.to_string()))?;
    rec.configuration = info_text(row, layout::CONFIGURATION)?.map(str::to_string);

    for (key, value) in row.family(EXTENDED_FAMILY) {
        let value = std::str::from_utf8(value)
            .map_err(|e| corrupt(row, format!("extension '{key}' is not UTF-8: {e}")))?;
        rec.extensions.insert(key.to_string(), value.to_string());
    }
    Ok(rec)
}

fn corrupt(row: &Row, reason: String) -> HistoryError {
    HistoryError::Corrupt {
        job_id: row.key.clone(),
        reason,
    }
}

fn info_text<'a>(row: &'a Row, qualifier: &str) -> Result<Option<&'a str>> {
    row.get_str(INFO_FAMILY, qualifier)
        .map_err(|e| corrupt(row, e.to_string()))
}

fn info_millis(row: &Row, qualifier: &str) -> Result<Option<u64>> {
    match info_text(row, qualifier)? {
        None => Ok(None),
        Some(s) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| corrupt(row, format!("{qualifier} '{s}': {e}"))),
    }
}
