//! Job history report tests

use std::sync::Arc;

use mrkit_core::{Counters, HistoryConfig, JobEndStatus, JobId};
use mrkit_history::{format_timestamp, HistoryError, JobHistoryReporter, JobHistoryStore, ReportOptions};
use mrkit_store::{MemoryInstance, StorageInstance, Table};

const START: u64 = 1_357_000_000_000;
const END: u64 = 1_357_000_065_000;

fn store_with_two_jobs() -> JobHistoryStore {
    let store = JobHistoryStore::ensure_installed(
        Arc::new(MemoryInstance::new()),
        &HistoryConfig::default(),
    )
    .unwrap();

    let one = JobId::from("job_local_0001");
    store
        .stage(&one, "email-domains", START, "{\"mrkit.producer\":\"email-domain\"}")
        .unwrap();
    let mut counters = Counters::new();
    counters.set("PRODUCER_ROWS_PROCESSED", 42);
    store
        .finalize(&one, END, JobEndStatus::Succeeded, &counters)
        .unwrap();

    let two = JobId::from("job_local_0002");
    store.stage(&two, "still-running", START, "{}").unwrap();
    store
}

#[test]
fn test_report_single_job() {
    let store = store_with_two_jobs();
    let text = JobHistoryReporter::new(&store)
        .report(&JobId::from("job_local_0001"))
        .unwrap();

    assert!(text.contains("email-domains"));
    assert!(text.contains("job_local_0001"));
    assert!(text.contains(&format_timestamp(START)));
    assert!(text.contains(&format_timestamp(END)));
    assert!(text.contains("SUCCEEDED"));
    assert!(!text.contains("PRODUCER_ROWS_PROCESSED"));
}

#[test]
fn test_report_unknown_job_is_not_found() {
    let store = store_with_two_jobs();
    let err = JobHistoryReporter::new(&store)
        .report(&JobId::from("job_missing"))
        .unwrap_err();
    assert!(matches!(err, HistoryError::RecordNotFound(id) if id == "job_missing"));
}

#[test]
fn test_report_all_lists_every_job_in_order() {
    let store = store_with_two_jobs();
    let text = JobHistoryReporter::new(&store).report_all().unwrap();

    let first = text.find("job_local_0001").unwrap();
    let second = text.find("job_local_0002").unwrap();
    assert!(first < second);
    assert_eq!(text.matches("Job ID:").count(), 2);
    assert!(text.contains("\n\nJob Name:   still-running\n"));

    // The running job has no end fields.
    let running = &text[second..];
    assert!(!running.contains("End Time:"));
    assert!(!running.contains("End Status:"));
}

#[test]
fn test_report_optional_sections() {
    let store = store_with_two_jobs();
    let id = JobId::from("job_local_0001");
    store.put_extension(&id, "owner", "data-eng").unwrap();

    let text = JobHistoryReporter::new(&store)
        .with_options(ReportOptions::all())
        .report(&id)
        .unwrap();
    assert!(text.contains("Counters:\n  PRODUCER_ROWS_PROCESSED=42\n"));
    assert!(text.contains("Configuration:\n  mrkit.producer=email-domain\n"));
    assert!(text.contains("Extensions:\n  owner=data-eng\n"));
}

#[test]
fn test_report_all_on_empty_table() {
    let store = JobHistoryStore::ensure_installed(
        Arc::new(MemoryInstance::new()),
        &HistoryConfig::default(),
    )
    .unwrap();
    assert_eq!(JobHistoryReporter::new(&store).report_all().unwrap(), "");
}

#[test]
fn test_report_all_skips_corrupt_records() {
    let store = store_with_two_jobs();
    let table = store.instance().open_table(store.table_name()).unwrap();
    table
        .put("job_local_0001a", "info", "startTime", b"not-a-number")
        .unwrap();

    let text = JobHistoryReporter::new(&store).report_all().unwrap();
    assert_eq!(text.matches("Job ID:").count(), 2);
    assert!(text.contains("job_local_0002"));
    assert!(!text.contains("job_local_0001a"));
}
