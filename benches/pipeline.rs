//! Benchmarks for expression evaluation and pipeline processing.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use listflow::expr::Expr;
use listflow::pipeline::modules::{FilterModule, ForEachModule, TransformModule};
use listflow::pipeline::{Module, ModuleConfig, ModuleKind, ModuleSpec, ProcessContext};
use serde_json::{json, Value};

fn int_payload(len: usize) -> Value {
    Value::Array((0..len as i64).map(Value::from).collect())
}

fn bench_expr(c: &mut Criterion) {
    let mut group = c.benchmark_group("expr");

    group.bench_function("parse", |b| {
        b.iter(|| Expr::parse(black_box("x % 2 == 0 and x < 500")).unwrap())
    });

    let expr = Expr::parse("x % 2 == 0 and x < 500").unwrap();
    group.bench_function("eval", |b| {
        let x = json!(123);
        b.iter(|| expr.eval_bool(black_box(&x)).unwrap())
    });

    let field_expr = Expr::parse("x.upper()").unwrap();
    group.bench_function("eval_string_method", |b| {
        let x = json!("payload");
        b.iter(|| field_expr.eval(black_box(&x)).unwrap())
    });

    group.finish();
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");

    for size in [100usize, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("keep_even", size), &size, |b, &size| {
            let mut filter =
                FilterModule::with_config(ModuleConfig::new().with("expr", "x % 2 == 0"));
            b.iter(|| {
                filter
                    .process(black_box(int_payload(size)), &mut ProcessContext::silent())
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform");

    for size in [100usize, 1_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("square", size), &size, |b, &size| {
            let mut transform =
                TransformModule::with_config(ModuleConfig::new().with("expr", "x * x"));
            b.iter(|| {
                transform
                    .process(black_box(int_payload(size)), &mut ProcessContext::silent())
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn bench_foreach(c: &mut Criterion) {
    let mut group = c.benchmark_group("foreach");

    for size in [100usize, 1_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(
            BenchmarkId::new("resolve_and_run_body", size),
            &size,
            |b, &size| {
                let mut foreach = ForEachModule::with_body(
                    "ForEach",
                    ModuleConfig::new(),
                    vec![ModuleSpec::KindConfig(
                        ModuleKind::Multiply,
                        Some(ModuleConfig::new().with("factor", 3)),
                    )],
                );
                b.iter(|| {
                    foreach
                        .process(black_box(int_payload(size)), &mut ProcessContext::silent())
                        .unwrap()
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_expr,
    bench_filter,
    bench_transform,
    bench_foreach
);
criterion_main!(benches);
