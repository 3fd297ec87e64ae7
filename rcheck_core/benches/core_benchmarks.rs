use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rcheck_core::lcs;
use rcheck_core::{equal, Dump, DumpConfig, Kind, Options, Reflect, Type, Value};
use std::collections::HashMap;

#[derive(Clone)]
struct Record {
    id: u64,
    name: String,
    tags: Vec<String>,
    scores: HashMap<String, i32>,
}

impl Reflect for Record {
    fn ty() -> Type {
        Type::new("Record", Kind::Struct)
    }

    fn reflect(&self) -> Value {
        Value::structure(Self::ty())
            .field("Id", &self.id)
            .field("Name", &self.name)
            .field("Tags", &self.tags)
            .field("Scores", &self.scores)
            .build()
    }
}

// Helper to build comparable record sets
fn create_records(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| Record {
            id: i as u64,
            name: format!("record_{}", i),
            tags: (0..4).map(|t| format!("tag_{}", t)).collect(),
            scores: (0..4).map(|s| (format!("k{}", s), (i * s) as i32)).collect(),
        })
        .collect()
}

// Helper to create two texts differing on every `every`-th line
fn create_texts(lines: usize, every: usize) -> (String, String) {
    let a: Vec<String> = (0..lines).map(|i| format!("line {}", i)).collect();
    let b: Vec<String> = (0..lines)
        .map(|i| {
            if i % every == 0 {
                format!("changed {}", i)
            } else {
                format!("line {}", i)
            }
        })
        .collect();
    (a.join("\n"), b.join("\n"))
}

fn bench_lcs(c: &mut Criterion) {
    let mut group = c.benchmark_group("lcs_lines");
    for lines in [100, 1000] {
        let (a, b) = create_texts(lines, 10);
        group.bench_with_input(BenchmarkId::from_parameter(lines), &(a, b), |bench, (a, b)| {
            bench.iter(|| black_box(lcs::diff_lines(black_box(a), black_box(b))));
        });
    }
    group.finish();
}

fn bench_unified(c: &mut Criterion) {
    c.bench_function("unified_500_lines", |b| {
        let (left, right) = create_texts(500, 25);
        b.iter(|| {
            black_box(lcs::unified(
                "want",
                "have",
                black_box(&left),
                black_box(&right),
                lcs::DEFAULT_CONTEXT,
            ))
        });
    });
}

fn bench_dump(c: &mut Criterion) {
    let records = create_records(100);
    let pretty = Dump::new(DumpConfig::new());
    let flat = Dump::new(DumpConfig::new().with_flat(true));

    c.bench_function("dump_pretty_100_records", |b| {
        b.iter(|| black_box(pretty.any(black_box(&records))));
    });
    c.bench_function("dump_flat_100_records", |b| {
        b.iter(|| black_box(flat.any(black_box(&records))));
    });
}

fn bench_compare(c: &mut Criterion) {
    let left = create_records(200);
    let mut right = left.clone();
    let opts = Options::new();

    c.bench_function("compare_identical_200_records", |b| {
        b.iter(|| black_box(equal(black_box(&left), black_box(&right), &opts)));
    });

    for (i, record) in right.iter_mut().enumerate() {
        if i % 20 == 0 {
            record.name.push('!');
        }
    }
    c.bench_function("compare_some_different_200_records", |b| {
        b.iter(|| black_box(equal(black_box(&left), black_box(&right), &opts)));
    });
}

criterion_group!(lcs_benches, bench_lcs, bench_unified);

criterion_group!(dump_benches, bench_dump);

criterion_group!(compare_benches, bench_compare);

criterion_main!(lcs_benches, dump_benches, compare_benches);
