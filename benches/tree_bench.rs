//! Performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hbtree::ops::{encode_operations, OperationRecord};
use hbtree::{build_tree, codec, HbtConfig, HeightBalancedTree};

fn scrambled_keys(n: i32) -> Vec<i32> {
    (0..n).map(|k| (k * 7919) % 100_003).collect()
}

fn benchmark_insert(c: &mut Criterion) {
    let keys = scrambled_keys(10_000);

    c.bench_function("insert_n=10000", |b| {
        b.iter(|| {
            let tree: HeightBalancedTree = keys.iter().copied().collect();
            black_box(tree.len());
        });
    });
}

fn benchmark_insert_delete_stream(c: &mut Criterion) {
    let keys = scrambled_keys(10_000);
    let mut records: Vec<_> = keys.iter().copied().map(OperationRecord::insert).collect();
    records.extend(keys.iter().step_by(2).copied().map(OperationRecord::delete));
    let ops = encode_operations(&records);
    let config = HbtConfig::default();

    c.bench_function("build_stream_n=15000", |b| {
        b.iter(|| {
            let tree = build_tree(black_box(ops.as_slice()), &config).expect("stream applies");
            black_box(tree.len());
        });
    });
}

fn benchmark_codec(c: &mut Criterion) {
    let tree: HeightBalancedTree = scrambled_keys(10_000).into_iter().collect();
    let bytes = tree.encode();

    c.bench_function("encode_n=10000", |b| {
        b.iter(|| black_box(codec::encode(&tree)));
    });
    c.bench_function("decode_n=10000", |b| {
        b.iter(|| black_box(codec::decode(&bytes).expect("valid stream")));
    });
}

criterion_group!(
    benches,
    benchmark_insert,
    benchmark_insert_delete_stream,
    benchmark_codec
);
criterion_main!(benches);
