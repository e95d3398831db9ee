use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use mrkit_core::{Counters, HistoryConfig, JobEndStatus, JobId, OutputSpec};
use mrkit_history::JobHistoryStore;
use mrkit_store::MemoryInstance;

fn bench_output_spec_parse(c: &mut Criterion) {
    let specs = [
        "kiji:kiji://hbase/instance/table@123",
        "hfile:kiji://hbase/instance/table;hdfs://localhost:1234/tmp/foo@8",
        "text:/data/out@16",
        "seq:asdf",
    ];
    c.bench_function("output_spec_parse", |b| {
        b.iter(|| {
            for s in &specs {
                let _ = std::hint::black_box(OutputSpec::parse(s));
            }
        })
    });
}

fn bench_history_stage_finalize(c: &mut Criterion) {
    let store = JobHistoryStore::ensure_installed(
        Arc::new(MemoryInstance::new()),
        &HistoryConfig::default(),
    )
    .unwrap();
    let mut counters = Counters::new();
    counters.set("PRODUCER_ROWS_PROCESSED", 1024);
    let mut n = 0u64;
    c.bench_function("history_stage_finalize", |b| {
        b.iter(|| {
            n += 1;
            let id = JobId::new(format!("job_bench_{n:08}"));
            store.stage(&id, "bench", n, "{}").unwrap();
            store
                .finalize(&id, n + 1, JobEndStatus::Succeeded, &counters)
                .unwrap();
        })
    });
}

fn bench_history_get_all(c: &mut Criterion) {
    let store = JobHistoryStore::ensure_installed(
        Arc::new(MemoryInstance::new()),
        &HistoryConfig::default(),
    )
    .unwrap();
    for i in 0..1000u64 {
        store
            .stage(&JobId::new(format!("job_{i:05}")), "bench", i, "{}")
            .unwrap();
    }
    c.bench_function("history_get_all_1000", |b| {
        b.iter(|| store.get_all().filter_map(Result::ok).count())
    });
}

criterion_group!(
    benches,
    bench_output_spec_parse,
    bench_history_stage_finalize,
    bench_history_get_all
);
criterion_main!(benches);
