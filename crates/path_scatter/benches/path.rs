mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

const SEGMENTS: [usize; 4] = [8, 64, 512, 4096];
const QUERIES: usize = 1024;

fn path_sample_at_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("path/sample_at");
    group.throughput(common::elements_throughput(QUERIES));

    for &segments in &SEGMENTS {
        let path = common::arc_path(5000.0, segments);
        let step = path.total_length() / QUERIES as f64;

        group.bench_with_input(BenchmarkId::from_parameter(segments), &segments, |b, _| {
            b.iter(|| {
                let mut acc = 0.0;
                for i in 0..QUERIES {
                    acc += path.sample_at(i as f64 * step).position.x;
                }
                black_box(acc);
            });
        });
    }

    group.finish();
}

fn path_from_polyline_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("path/from_polyline");

    for &segments in &SEGMENTS {
        group.throughput(common::elements_throughput(segments + 1));
        group.bench_with_input(BenchmarkId::from_parameter(segments), &segments, |b, &n| {
            b.iter(|| black_box(common::arc_path(5000.0, n).total_length()));
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = path_sample_at_benches, path_from_polyline_benches
}
criterion_main!(benches);
