//! Benchmarks for composition diffing and grapheme boundary scans
//!
//! Run with: cargo bench -p preedit-engine

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use preedit_engine::{CompositionDiff, TextBoundaries};

// ============================================================================
// Boundary scans
// ============================================================================

fn bench_boundaries(c: &mut Criterion) {
    let mut group = c.benchmark_group("boundaries");

    let ascii = "the quick brown fox jumps over the lazy dog ".repeat(64);
    let mixed = "日本語の\u{1F600}テキスト e\u{0301} \u{1F468}\u{200D}\u{1F469} ";
    let mixed = mixed.repeat(64);

    group.bench_function("ascii", |b| b.iter(|| TextBoundaries::new(black_box(&ascii))));
    group.bench_function("mixed", |b| b.iter(|| TextBoundaries::new(black_box(&mixed))));

    group.finish();
}

// ============================================================================
// Composition diffs
// ============================================================================

fn bench_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff");

    let document = format!("{}nihao{}", "prefix ".repeat(200), " suffix".repeat(200));
    let base = "prefix ".repeat(200).len();
    let boundaries = TextBoundaries::new(&document);

    group.bench_function("append_key", |b| {
        b.iter(|| {
            CompositionDiff::compute(black_box("nihao"), black_box("nihaom"), base, &boundaries)
        })
    });
    group.bench_function("candidate_swap", |b| {
        b.iter(|| {
            CompositionDiff::compute(black_box("nihao"), black_box("你好"), base, &boundaries)
        })
    });

    let long_old = "かな".repeat(256);
    let long_new = format!("{}漢字{}", "かな".repeat(128), "かな".repeat(127));
    let long_boundaries = TextBoundaries::new(&long_old);
    group.bench_function("long_middle_edit", |b| {
        b.iter(|| {
            let (old, new) = (black_box(&long_old), black_box(&long_new));
            CompositionDiff::compute(old, new, 0, &long_boundaries)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_boundaries, bench_diff);
criterion_main!(benches);
