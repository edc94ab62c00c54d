use criterion::{black_box, criterion_group, criterion_main, Criterion};
use screenshot_events::{max_detail_level, JobRecord, JobRequest, Notification};
use serde_json::json;
use std::time::Duration;

// Fast settings for all benchmarks
fn configure_fast_group(group: &mut criterion::BenchmarkGroup<criterion::measurement::WallTime>) {
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_millis(500));
    group.sample_size(20);
}

fn benchmark_record_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("record");
    configure_fast_group(&mut group);

    let mut base = JobRecord::new(42u64, "in_queue").with_correlation(Some("front-page"));
    base.url = Some("https://example.com".to_string());

    group.bench_function("merge", |b| {
        b.iter(|| {
            let mut record = base.clone();
            let mut update = JobRecord::new(42u64, "finished");
            update.final_url = Some("https://www.example.com/".to_string());
            update.details.insert("size".to_string(), json!("page"));
            record.merge(black_box(update));
            black_box(record);
        });
    });

    group.bench_function("parse_status_response", |b| {
        let body = r#"{"id":42,"status":"processing","url":"https://example.com","size":"page","delay":2}"#;
        b.iter(|| {
            let record: JobRecord = serde_json::from_str(black_box(body)).unwrap();
            black_box(record);
        });
    });

    group.finish();
}

fn benchmark_batch_requests(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_requests");
    configure_fast_group(&mut group);

    let common = JobRequest::default()
        .with_details(1)
        .with_option("instance_id", 12);
    let requests: Vec<JobRequest> = (0..100)
        .map(|i| JobRequest::new(format!("https://example.com/{i}")).with_details((i % 4) as u8))
        .collect();

    group.bench_function("merge_over_common", |b| {
        b.iter(|| {
            let merged: Vec<JobRequest> = requests.iter().map(|r| r.merged_over(&common)).collect();
            black_box(merged);
        });
    });

    group.bench_function("max_detail_level", |b| {
        b.iter(|| black_box(max_detail_level(common.details, &requests)));
    });

    group.finish();
}

fn benchmark_notification_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("notification");
    configure_fast_group(&mut group);

    let records: Vec<JobRecord> = ["in_queue", "processing", "finished", "error"]
        .iter()
        .map(|status| JobRecord::new(1u64, *status))
        .collect();

    group.bench_function("for_record", |b| {
        b.iter(|| {
            for record in &records {
                let notification = Notification::for_record(black_box(record.clone()));
                black_box(notification.is_terminal());
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_record_merge,
    benchmark_batch_requests,
    benchmark_notification_classification
);
criterion_main!(benches);
