//! Execution engine seam and the in-process `LocalEngine`.

use std::collections::hash_map::DefaultHasher;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::hash::{Hash, Hasher};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use mrkit_core::{Counters, JobEndStatus, JobId, OutputFormat, OutputSpec};
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::error::{ExecError, Result};
use crate::handle::{JobHandle, JobOutcome, OutputRecord};
use crate::job::PreparedJob;
use crate::producer::{counters, ProducerContext};

/// Something that can run a prepared job in the background.
pub trait ExecutionEngine: Send + Sync {
    /// Start `job` and return immediately with a handle on it.
    fn submit(&self, job: PreparedJob) -> Result<JobHandle>;
}

/// Runs each job on its own worker thread inside this process.
///
/// Job ids look like `job_local_0001_<uuid>`; the sequence number keeps ids
/// from one engine in submission order.
#[derive(Debug, Default)]
pub struct LocalEngine {
    seq: AtomicU64,
}

impl LocalEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_job_id(&self) -> JobId {
        let n = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        JobId::new(format!("job_local_{n:04}_{}", Uuid::new_v4().simple()))
    }
}

impl ExecutionEngine for LocalEngine {
    fn submit(&self, job: PreparedJob) -> Result<JobHandle> {
        let job_id = self.next_job_id();
        let (handle, completer) = JobHandle::new(job_id.clone());
        info!(job_id = %job_id, job_name = %job.name, producer = job.producer.name(), "submitting job");

        thread::Builder::new()
            .name(format!("mrkit-{job_id}"))
            .spawn(move || {
                let span = info_span!("job", job_id = %job_id);
                let _enter = span.enter();
                let outcome = execute(&job);
                info!(status = %outcome.status, "job finished");
                completer.complete(outcome);
            })
            .map_err(|e| ExecError::Engine(format!("cannot start worker: {e}")))?;
        Ok(handle)
    }
}

/// Run the producer over every input row, then write the output.
fn execute(job: &PreparedJob) -> JobOutcome {
    let producer = job.producer.as_ref();
    let request = producer.data_request();
    let column = producer.output_column().to_string();

    let mut totals = Counters::new();
    let mut outputs = Vec::new();

    for row in &job.input {
        let mut ctx = ProducerContext::new();
        if let Err(e) = producer.produce(&row.project(&request), &mut ctx) {
            warn!(row = %row.key, error = %e, "producer failed");
            return JobOutcome::failed(format!("row '{}': {e}", row.key), totals);
        }
        let (values, user) = ctx.into_parts();
        totals.merge(&user);
        totals.increment(counters::ROWS_PROCESSED, 1);
        if values.is_empty() {
            totals.increment(counters::ROWS_SKIPPED, 1);
        } else {
            totals.increment(counters::ROWS_EMITTED, 1);
        }
        outputs.extend(values.into_iter().map(|value| OutputRecord {
            key: row.key.clone(),
            column: column.clone(),
            value,
        }));
    }
    // Always present, even for empty input.
    for name in [counters::ROWS_PROCESSED, counters::ROWS_EMITTED, counters::ROWS_SKIPPED] {
        totals.increment(name, 0);
    }

    if job.output.format() == OutputFormat::Text {
        if let Err(e) = write_text_output(&job.output, &outputs) {
            warn!(output = %job.output, error = %e, "cannot write job output");
            return JobOutcome::failed(e.to_string(), totals);
        }
    }

    JobOutcome {
        status: JobEndStatus::Succeeded,
        counters: totals,
        outputs,
        error: None,
    }
}

/// Write `key\tvalue` lines into part files under the output location,
/// partitioned by row key across `splits` partitions.
///
/// A part file is created the first time a key hashes into it, so empty
/// partitions leave no file behind.
fn write_text_output(spec: &OutputSpec, records: &[OutputRecord]) -> Result<()> {
    let dir = Path::new(spec.location());
    fs::create_dir_all(dir)
        .map_err(|e| ExecError::Output(format!("cannot create {}: {e}", dir.display())))?;

    let splits = spec.splits() as usize;
    let mut parts: BTreeMap<usize, BufWriter<File>> = BTreeMap::new();
    for rec in records {
        let index = partition(&rec.key, splits);
        let part = match parts.entry(index) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                e.insert(BufWriter::new(File::create(dir.join(part_name(index)))?))
            }
        };
        writeln!(part, "{}\t{}", rec.key, rec.value)?;
    }
    for part in parts.values_mut() {
        part.flush()?;
    }
    debug!(dir = %dir.display(), splits, records = records.len(), "wrote text output");
    Ok(())
}

pub fn part_name(index: usize) -> String {
    format!("part-r-{index:05}")
}

fn partition(key: &str, splits: usize) -> usize {
    let mut h = DefaultHasher::new();
    key.hash(&mut h);
    (h.finish() % splits as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobDefinition;
    use crate::producer::InputRow;
    use crate::registry::Registry;
    use std::time::Duration;

    fn users() -> Vec<InputRow> {
        vec![
            InputRow::new("u1").with("info:email", "ann@example.org"),
            InputRow::new("u2").with("info:email", "bob@kiji.org"),
            InputRow::new("u3").with("info:name", "no email"),
        ]
    }

    #[test]
    fn local_job_ids_are_sequenced() {
        let engine = LocalEngine::new();
        let a = engine.next_job_id();
        let b = engine.next_job_id();
        assert!(a.as_str().starts_with("job_local_0001_"));
        assert!(b.as_str().starts_with("job_local_0002_"));
        assert!(a < b);
    }

    #[test]
    fn producer_job_counts_rows() {
        let job = JobDefinition::builder()
            .producer("email-domain")
            .input(users())
            .output("seq:/unused@1")
            .build(&Registry::builtin())
            .unwrap();
        let handle = LocalEngine::new().submit(job).unwrap();
        let outcome = handle.wait(Duration::from_secs(10)).unwrap();

        assert!(outcome.is_successful());
        assert_eq!(outcome.counters.get(counters::ROWS_PROCESSED), 3);
        assert_eq!(outcome.counters.get(counters::ROWS_EMITTED), 2);
        assert_eq!(outcome.counters.get(counters::ROWS_SKIPPED), 1);
        let domains: Vec<&str> = outcome.outputs.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(domains, ["example.org", "kiji.org"]);
    }

    #[test]
    fn failing_producer_fails_the_job() {
        let job = JobDefinition::builder()
            .producer("always-fail")
            .input(users())
            .output("seq:/unused@1")
            .build(&Registry::builtin())
            .unwrap();
        let outcome = LocalEngine::new()
            .submit(job)
            .unwrap()
            .wait(Duration::from_secs(10))
            .unwrap();
        assert_eq!(outcome.status, JobEndStatus::Failed);
        assert!(outcome.error.unwrap().contains("always fails"));
    }

    #[test]
    fn text_output_is_split_into_parts() {
        let mut dir = std::env::temp_dir();
        dir.push(format!("mrkit-engine-text-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        let spec = OutputSpec::create(OutputFormat::Text, dir.display().to_string(), 3).unwrap();
        let records: Vec<OutputRecord> = (0..10)
            .map(|i| OutputRecord {
                key: format!("row{i}"),
                column: "derived:x".into(),
                value: i.to_string(),
            })
            .collect();
        write_text_output(&spec, &records).unwrap();

        let mut lines = 0;
        for i in 0..3 {
            let text = fs::read_to_string(dir.join(part_name(i))).unwrap_or_default();
            lines += text.lines().count();
        }
        assert_eq!(lines, 10);
        assert!(!dir.join(part_name(3)).exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn huge_split_counts_only_create_used_parts() {
        let mut dir = std::env::temp_dir();
        dir.push(format!("mrkit-engine-huge-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        let spec =
            OutputSpec::parse(&format!("text:{}@{}", dir.display(), u32::MAX)).unwrap();
        let records: Vec<OutputRecord> = ["a", "b"]
            .into_iter()
            .map(|key| OutputRecord {
                key: key.into(),
                column: "derived:x".into(),
                value: "1".into(),
            })
            .collect();
        write_text_output(&spec, &records).unwrap();

        let files = fs::read_dir(&dir).unwrap().count();
        assert!((1..=2).contains(&files));
        let _ = fs::remove_dir_all(&dir);
    }
}
