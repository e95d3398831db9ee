//! Human-readable job history reports.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use mrkit_core::{JobConf, JobId, JobRecord};
use tracing::warn;

use crate::error::{HistoryError, Result};
use crate::store::JobHistoryStore;

/// Optional report sections. The summary lines are always printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    pub counters: bool,
    pub configuration: bool,
    pub extensions: bool,
}

impl ReportOptions {
    pub fn all() -> Self {
        Self {
            counters: true,
            configuration: true,
            extensions: true,
        }
    }
}

pub struct JobHistoryReporter<'a> {
    store: &'a JobHistoryStore,
    options: ReportOptions,
}

impl<'a> JobHistoryReporter<'a> {
    pub fn new(store: &'a JobHistoryStore) -> Self {
        Self {
            store,
            options: ReportOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ReportOptions) -> Self {
        self.options = options;
        self
    }

    /// Report for one job. An unknown id yields `RecordNotFound`.
    pub fn report(&self, job_id: &JobId) -> Result<String> {
        let record = self.store.get_job_details(job_id)?;
        Ok(render(&record, &self.options))
    }

    /// Reports for every job, in row-key order, separated by a blank line.
    ///
    /// Undecodable records are logged and left out; a storage failure aborts
    /// the report.
    pub fn report_all(&self) -> Result<String> {
        let mut out = String::new();
        for record in self.store.get_all() {
            let record = match record {
                Ok(record) => record,
                Err(HistoryError::Corrupt { job_id, reason }) => {
                    warn!(job_id = %job_id, reason = %reason, "skipping corrupt job history record");
                    continue;
                }
                Err(e) => return Err(e),
            };
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&render(&record, &self.options));
        }
        Ok(out)
    }
}

/// Render one record. Fields that were never written are left out.
pub fn render(record: &JobRecord, options: &ReportOptions) -> String {
    let mut out = String::new();
    if let Some(name) = &record.job_name {
        line(&mut out, "Job Name:", name);
    }
    line(&mut out, "Job ID:", record.job_id.as_str());
    if let Some(ms) = record.start_time {
        line(&mut out, "Start Time:", &format_timestamp(ms));
    }
    if let Some(ms) = record.end_time {
        line(&mut out, "End Time:", &format_timestamp(ms));
    }
    if let Some(status) = record.end_status {
        line(&mut out, "End Status:", status.as_str());
    }

    if options.counters {
        if let Some(counters) = record.counters.as_ref().filter(|c| !c.is_empty()) {
            out.push_str("Counters:\n");
            for (name, value) in counters.iter() {
                let _ = writeln!(out, "  {name}={value}");
            }
        }
    }

    if options.configuration {
        if let Some(blob) = &record.configuration {
            out.push_str("Configuration:\n");
            match JobConf::from_text(blob) {
                Ok(conf) => {
                    for (key, value) in conf.iter() {
                        let _ = writeln!(out, "  {key}={value}");
                    }
                }
                // Not a JobConf blob; print it as stored.
                Err(_) => {
                    for raw in blob.lines() {
                        let _ = writeln!(out, "  {raw}");
                    }
                }
            }
        }
    }

    if options.extensions && !record.extensions.is_empty() {
        out.push_str("Extensions:\n");
        for (key, value) in &record.extensions {
            let _ = writeln!(out, "  {key}={value}");
        }
    }
    out
}

fn line(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, "{label:<12}{value}");
}

/// UTC wall-clock rendering of epoch milliseconds, e.g.
/// `Tue Jan 01 00:26:40 UTC 2013`.
pub fn format_timestamp(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|t| t.format("%a %b %d %H:%M:%S UTC %Y").to_string())
        .unwrap_or_else(|| format!("{ms} ms"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrkit_core::{Counters, JobEndStatus};

    fn finished() -> JobRecord {
        let mut rec = JobRecord::new(JobId::from("job_local_1"));
        rec.job_name = Some("email-domains".into());
        rec.start_time = Some(1_357_000_000_000);
        rec.end_time = Some(1_357_000_065_000);
        rec.end_status = Some(JobEndStatus::Succeeded);
        let mut counters = Counters::new();
        counters.set("PRODUCER_ROWS_PROCESSED", 4);
        rec.counters = Some(counters);
        rec
    }

    #[test]
    fn timestamps_render_in_utc() {
        assert_eq!(format_timestamp(1_357_000_000_000), "Tue Jan 01 00:26:40 UTC 2013");
        assert_eq!(format_timestamp(1_357_000_065_000), "Tue Jan 01 00:27:45 UTC 2013");
    }

    #[test]
    fn summary_lines() {
        let text = render(&finished(), &ReportOptions::default());
        assert_eq!(
            text,
            "Job Name:   email-domains\n\
             Job ID:     job_local_1\n\
             Start Time: Tue Jan 01 00:26:40 UTC 2013\n\
             End Time:   Tue Jan 01 00:27:45 UTC 2013\n\
             End Status: SUCCEEDED\n"
        );
    }

    #[test]
    fn absent_fields_are_omitted() {
        let mut rec = JobRecord::new(JobId::from("job_2"));
        rec.start_time = Some(0);
        let text = render(&rec, &ReportOptions::all());
        assert!(text.contains("Job ID:     job_2"));
        assert!(text.contains("Start Time: Thu Jan 01 00:00:00 UTC 1970"));
        assert!(!text.contains("Job Name:"));
        assert!(!text.contains("End Time:"));
        assert!(!text.contains("End Status:"));
        assert!(!text.contains("Counters:"));
        assert!(!text.contains("Configuration:"));
    }

    #[test]
    fn optional_sections() {
        let mut rec = finished();
        let mut conf = JobConf::new();
        conf.set("mrkit.producer", "email-domain");
        rec.configuration = Some(conf.to_text().unwrap());
        rec.extensions.insert("owner".into(), "alice".into());

        let plain = render(&rec, &ReportOptions::default());
        assert!(!plain.contains("PRODUCER_ROWS_PROCESSED"));

        let full = render(&rec, &ReportOptions::all());
        assert!(full.contains("Counters:\n  PRODUCER_ROWS_PROCESSED=4\n"));
        assert!(full.contains("Configuration:\n  mrkit.producer=email-domain\n"));
        assert!(full.contains("Extensions:\n  owner=alice\n"));
    }

    #[test]
    fn raw_configuration_is_printed_as_is() {
        let mut rec = finished();
        rec.configuration = Some("not json".into());
        let text = render(
            &rec,
            &ReportOptions {
                configuration: true,
                ..ReportOptions::default()
            },
        );
        assert!(text.contains("Configuration:\n  not json\n"));
    }
}
