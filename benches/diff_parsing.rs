//! Diff parsing benchmarks for sidediff.
//!
//! These benchmarks measure the performance of:
//! - Patch segmenting and parsing (git and unified modes)
//! - Chunk body reading with line alignment
//! - Side-by-side assembly

mod common;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tokio_util::sync::CancellationToken;

use common::{generate_git_patch, generate_unified_patch};
use sidediff::diff::{read_chunk_body, read_patch};
use sidediff::side_by_side::{assemble, DiffTheme};

/// Benchmark whole-patch parsing.
///
/// Covers footer stripping, header parsing, chunk reading and alignment
/// for patches of growing file count.
fn bench_read_patch(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_parsing/read_patch");

    for file_count in [1, 10, 50] {
        let patch = generate_git_patch(file_count, 4);

        group.throughput(Throughput::Bytes(patch.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(file_count),
            &patch,
            |b, patch| {
                b.iter(|| black_box(read_patch(black_box(patch))));
            },
        );
    }

    group.finish();
}

/// Benchmark the unified fallback, which first fails git mode.
fn bench_read_unified_patch(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_parsing/read_unified_patch");

    for hunks in [4, 40] {
        let patch = generate_unified_patch(hunks);
        group.bench_with_input(BenchmarkId::from_parameter(hunks), &patch, |b, patch| {
            b.iter(|| black_box(read_patch(black_box(patch))));
        });
    }

    group.finish();
}

/// Benchmark a single chunk body: merging, char refinement and alignment.
fn bench_read_chunk_body(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_parsing/read_chunk_body");

    // Body of a single hunk, without its header line or final newline
    let patch = generate_git_patch(1, 1);
    let body_start = patch.find("\n@@ ").map_or(0, |pos| pos + 1);
    let body = patch[body_start..]
        .split_once('\n')
        .map_or("", |(_, body)| body.trim_end_matches('\n'))
        .to_string();

    group.bench_function("30_lines", |b| {
        b.iter(|| black_box(read_chunk_body(black_box(&body), false)));
    });

    group.finish();
}

/// Benchmark side-by-side assembly of already parsed files.
fn bench_assemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_parsing/assemble");
    let theme = DiffTheme::default();
    let token = CancellationToken::new();

    for file_count in [1, 10, 50] {
        let files = read_patch(&generate_git_patch(file_count, 4));
        group.bench_with_input(
            BenchmarkId::from_parameter(file_count),
            &files,
            |b, files| {
                b.iter(|| black_box(assemble(black_box(files), &theme, &token)));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_read_patch,
    bench_read_unified_patch,
    bench_read_chunk_body,
    bench_assemble,
);
criterion_main!(benches);
